use anyhow::Result;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::config::HarnessConfig;

#[derive(Serialize)]
struct InfoReport<'a> {
    version: &'static str,
    build_date: &'static str,
    git_hash: &'static str,
    config_source: String,
    config: &'a HarnessConfig,
}

pub fn cmd_info(ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let report = InfoReport {
        version: env!("CARGO_PKG_VERSION"),
        build_date: env!("BUILD_DATE"),
        git_hash: env!("GIT_HASH"),
        config_source: ctx.source().to_string(),
        config,
    };
    if ctx.output().emit(&report)? {
        return Ok(());
    }

    println!("SoulHarness System Information");
    println!("==============================");
    println!("Version: {}", report.version);
    println!("Build Date: {}", report.build_date);
    println!("Git Commit: {}", report.git_hash);
    println!();

    println!("Configuration ({}):", report.config_source);
    println!("- Step Retry: {}", config.retries.step_retry);
    println!("- Backoff: {}ms", config.retries.backoff_ms);
    println!("- Element Wait: {}ms", config.timeouts.element_wait_ms);
    println!("- Healing Ledger: {}", config.healing.ledger_path.display());
    println!("- Diagnostics Dir: {}", config.diagnostics.dir.display());
    match &config.logging.dir {
        Some(dir) => println!("- Log Dir: {}", dir.display()),
        None => println!("- Log Dir: (console only)"),
    }
    Ok(())
}
