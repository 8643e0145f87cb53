use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config};
use crate::config;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let loaded = load_config(cli.config.as_deref())?;
    let _log_guard = init_logging(
        cli.log_level.as_deref(),
        cli.debug,
        &loaded.config.logging,
    )?;

    info!("Starting SoulHarness v{}", env!("CARGO_PKG_VERSION"));
    info!(source = %loaded.source, "Configuration loaded");

    let config = config::init(loaded.config);
    let ctx = CliContext::new(config, loaded.source, cli.output.clone());

    match dispatch(&cli, &ctx).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
