use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use xray_cam::config::Config;
use xray_cam::XrResult;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file; flags given on the command line take precedence.
    #[arg(global = true, long)]
    config_file: Option<PathBuf>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay recorded model outputs through the CAM pipeline.
    Analyze(cmd::analyze::AnalyzeArgs),
    /// Load and summarize a final-layer weight file.
    Weights(cmd::weights::WeightsArgs),
}

/// File config (if any) with explicit CLI flags merged on top.
fn resolve_config(
    path: &Option<PathBuf>,
    cli_config: &Config,
    sub_matches: &ArgMatches,
) -> XrResult<Config> {
    let Some(path) = path else {
        return Ok(cli_config.clone());
    };

    info!("⚙️  Loading config from: {}", path.display());
    let mut config = Config::load_from_file(path)?;
    config.merge_from_cli(cli_config, sub_matches);
    Ok(config)
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let (cli_config, sub_name) = match &cli.command {
        Commands::Analyze(args) => (&args.config, "analyze"),
        Commands::Weights(args) => (&args.config, "weights"),
    };
    let sub_matches = matches
        .subcommand_matches(sub_name)
        .unwrap_or_else(|| unreachable!("clap routed to '{}'", sub_name));

    let config = resolve_config(&cli.config_file, cli_config, sub_matches)
        .and_then(|c| c.validate().map(|_| c))
        .unwrap_or_else(|e| {
            error!("❌ Invalid configuration: {}", e);
            process::exit(1);
        });

    let outcome = match cli.command {
        Commands::Analyze(args) => cmd::analyze::run(args, config),
        Commands::Weights(args) => cmd::weights::run(args, config),
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}
