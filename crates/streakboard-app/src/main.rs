use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use streakboard_infrastructure::logging::init_logger;
use streakboard_lib::application::services::ConfigService;
use streakboard_lib::presentation::scenario::{replay, Scenario};

/// Replay a streak scenario and print the resulting report
#[derive(Parser, Debug)]
#[command(name = "streakboard")]
#[command(version)]
struct Cli {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Engine config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("streakboard")
        .join("logs")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => ConfigService::default_path().context("No config directory on this platform")?,
    };
    let config_service = ConfigService::load(config_path)?;
    let config = config_service.config();

    let log_dir = log_dir();
    if let Err(e) = init_logger(&log_dir, config.log_level.as_str()) {
        eprintln!("Failed to initialize file logging: {}", e);
    }
    tracing::info!(
        "streakboard starting scenario={} config={}",
        args.scenario.display(),
        config_service.path().display()
    );

    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("Failed to read scenario {}", args.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed scenario {}", args.scenario.display()))?;

    let report = replay(config, &scenario).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
