use crate::reports;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use xray_cam::config::Config;
use xray_cam::pipeline::{runner, AnalysisPipeline, CancelToken, OverlaySurface, ReplayModel};
use xray_cam::results::{build_results, select_exclusive, selected, ResultsPolicy};
use xray_cam::{CamProcessor, Condition, WeightTable, XrResult};

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub config: Config,

    /// Square, already-cropped X-ray image.
    #[arg(short, long)]
    pub image: PathBuf,

    /// JSON recording of the model outputs: scores first, activations second.
    #[arg(short, long)]
    pub recording: PathBuf,

    /// Final-layer weight CSV (one row per condition).
    #[arg(short, long)]
    pub weights: PathBuf,

    /// Split the recording across separate score and CAM adapters.
    #[arg(long, default_value_t = false)]
    pub dual: bool,

    /// Write the overlay for the selected result to this PNG.
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Rank of the result to overlay (0 = most likely).
    #[arg(long, default_value_t = 0)]
    pub select: usize,
}

pub fn run(args: AnalyzeArgs, config: Config) -> XrResult<()> {
    println!("\n🚀 Initializing X-Ray CAM pipeline...");
    let model_cfg = &config.model;

    info!("📂 Loading image: {}", args.image.display());
    let image = image::open(&args.image)?.to_rgba8();

    let weights = Arc::new(WeightTable::load_for_conditions(
        &args.weights,
        model_cfg.cam_channels,
    )?);
    let cam_processor =
        CamProcessor::new(model_cfg.flatten_order, model_cfg.tensor_shape(), weights)?;

    let recording = ReplayModel::load_from_file(&args.recording)?;
    let pipeline = if args.dual {
        AnalysisPipeline::dual(
            Box::new(recording.select_output(0)?),
            Box::new(recording.select_output(1)?),
            cam_processor,
            model_cfg.input_width,
        )
    } else {
        AnalysisPipeline::single(Box::new(recording), cam_processor, model_cfg.input_width)
    };

    let cancel = CancelToken::new();
    let analysis = runner::analyze(&pipeline, &image, &cancel);
    pipeline.shutdown();
    let analysis = analysis?;

    let palette = config.visual.get_palette()?;
    let policy = ResultsPolicy::from(&config.results);
    let mut results = build_results(
        &Condition::all(),
        &analysis.scores,
        analysis.cams,
        &palette,
        &policy,
    )?;

    reports::print_results(&results);

    if let Some(out) = args.out {
        select_exclusive(&mut results, args.select)?;
        if let Some(chosen) = selected(&results) {
            info!("🎨 Rendering overlay for {}", chosen.condition);
            debug!("CAM for {}:\n{}", chosen.condition, chosen.cam);
            let surface = OverlaySurface::new(image, config.visual.exp_base);
            let overlay = surface.visualize(&chosen.cam, chosen.color)?;
            overlay.save(&out)?;
            info!("💾 Overlay written to {}", out.display());
        }
    }

    Ok(())
}
