use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::error;

use os_floor_sync::config::{ConfigOverrides, SyncConfig};
use os_floor_sync::logging::{self, LogFormat};
use os_floor_sync::report::{RunSummary, TargetReport};
use os_floor_sync::sync;

#[derive(Parser)]
#[command(name = "os-floor-sync")]
#[command(
    version,
    about = "Keep a compliance policy's minimum OS version a fixed window behind the latest release"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a JSON config file
    #[arg(long, env = "OS_FLOOR_SYNC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT", global = true)]
    log_format: LogFormat,

    /// Write logs to this file instead of stderr
    #[arg(long, env = "LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Subcommand)]
enum Command {
    /// Update the policy's minimum OS version (default)
    Sync,
    /// Print the computed target version without contacting the policy service
    Target,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(cli.log_format, cli.log_file.as_deref())?;

    let config = SyncConfig::load(cli.config.as_deref())?.with_overrides(cli.overrides);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Command::Sync) {
        Command::Sync => runtime.block_on(run_sync(&config)),
        Command::Target => runtime.block_on(run_target(&config)),
    }
}

async fn run_sync(config: &SyncConfig) -> anyhow::Result<()> {
    let started = Instant::now();

    let result = match config.credentials_from_env() {
        Ok(credentials) => sync::run(config, &credentials).await,
        Err(e) => Err(e.into()),
    };

    let summary = match &result {
        Ok(outcome) => RunSummary::from_outcome(outcome, config.dry_run, started.elapsed(), Utc::now()),
        Err(e) => {
            error!("Sync failed: {}", e);
            RunSummary::from_error(
                config.policy_id.as_deref(),
                config.dry_run,
                e,
                started.elapsed(),
                Utc::now(),
            )
        }
    };

    println!("{}", serde_json::to_string(&summary)?);

    result.map(|_| ()).context("policy sync failed")
}

async fn run_target(config: &SyncConfig) -> anyhow::Result<()> {
    let selection = sync::run_target(config)
        .await
        .context("failed to compute target version")?;

    println!("{}", serde_json::to_string(&TargetReport::from(&selection))?);

    Ok(())
}
