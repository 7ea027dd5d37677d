use crate::reports;
use clap::Args;
use std::path::PathBuf;
use xray_cam::config::Config;
use xray_cam::{WeightTable, XrResult};

#[derive(Args, Debug, Clone)]
pub struct WeightsArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub weights: PathBuf,
}

pub fn run(args: WeightsArgs, config: Config) -> XrResult<()> {
    let table = WeightTable::load_for_conditions(&args.weights, config.model.cam_channels)?;
    reports::print_weight_summary(&table);
    Ok(())
}
