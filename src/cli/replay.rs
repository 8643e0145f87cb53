use std::path::PathBuf;
use std::sync::Arc;

use action_flow::{
    ActionExecutor, BasePage, DiagnosticsSink, SnapshotDriver, UiDriver,
};
use action_locator::{DefaultLocatorHealer, HealingLedger, JsonFileLedger};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, ValueEnum};
use serde::Serialize;
use soulharness_core_types::{DriverError, Locator};
use tracing::{info, warn};

use super::locator::{load_snapshot, parse_locator};
use crate::cli::context::CliContext;
use crate::diagnostics::{ArtifactDirSink, TracingSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayAction {
    Click,
    Type,
    Read,
}

#[derive(Args, Clone, Debug)]
pub struct ReplayArgs {
    /// UI snapshot (JSON document tree) the offline driver resolves against
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    #[arg(long, value_enum)]
    pub action: ReplayAction,

    /// Locator strategy (id, xpath, name, attributes, ...)
    #[arg(long)]
    pub strategy: String,

    /// Locator value
    #[arg(long)]
    pub value: String,

    /// Text to type (required for `--action type`)
    #[arg(long)]
    pub text: Option<String>,

    /// Fail the next driver interactions with these error kinds, in order
    #[arg(long = "fail-with", value_name = "KIND")]
    pub fail_with: Vec<String>,

    /// Override retries.step_retry
    #[arg(long)]
    pub retries: Option<u32>,

    /// Ledger file (defaults to healing.ledger_path)
    #[arg(long, value_name = "FILE")]
    pub ledger: Option<PathBuf>,

    /// Log diagnostics instead of writing them to the diagnostics directory
    #[arg(long)]
    pub no_artifacts: bool,
}

#[derive(Serialize)]
struct ReplayReport {
    action: ReplayAction,
    locator: Locator,
    healed_to: Option<Locator>,
    text: Option<String>,
}

pub async fn cmd_replay(args: ReplayArgs, ctx: &CliContext) -> Result<()> {
    let config = ctx.config();
    let locator = parse_locator(&args.strategy, &args.value)?;
    let snapshot = load_snapshot(&args.snapshot).await?;

    let failures = args
        .fail_with
        .iter()
        .map(|kind| DriverError::new(kind, "Injected by replay"));
    let driver = Arc::new(SnapshotDriver::new(snapshot).with_failures(failures));

    let mut policy = config.retry_policy();
    if let Some(retries) = args.retries {
        policy.max_retries = retries;
    }

    let ledger_path = args
        .ledger
        .clone()
        .unwrap_or_else(|| config.healing.ledger_path.clone());
    let ledger = Arc::new(JsonFileLedger::new(&ledger_path));
    let diagnostics: Arc<dyn DiagnosticsSink> = if args.no_artifacts {
        Arc::new(TracingSink)
    } else {
        Arc::new(ArtifactDirSink::new(&config.diagnostics.dir))
    };

    let executor = ActionExecutor::new(
        driver.clone(),
        Arc::new(DefaultLocatorHealer::new()),
        ledger.clone(),
        diagnostics,
        policy,
    );
    let page = BasePage::new(Arc::new(executor)).with_element_wait(config.element_wait());

    info!(action = ?args.action, locator = %locator, "Replaying action");
    let started = Utc::now();
    let outcome = match args.action {
        ReplayAction::Click => page.click(&locator).await.map(|_| None),
        ReplayAction::Type => {
            let text = args
                .text
                .as_deref()
                .context("--text is required for --action type")?;
            page.enter_text(&locator, text).await.map(|_| None)
        }
        ReplayAction::Read => page.get_text(&locator).await,
    };

    if let Err(err) = driver.quit().await {
        warn!(error = %err, "Failed to close driver");
    }
    let text = outcome?;

    let healed_to = ledger
        .load()
        .remove(&locator.key())
        .filter(|entry| entry.discovered() >= started)
        .map(|entry| entry.healed().clone());

    let report = ReplayReport {
        action: args.action,
        locator,
        healed_to,
        text,
    };
    if !ctx.output().emit(&report)? {
        println!("Action succeeded: {:?} {}", report.action, report.locator);
        if let Some(healed) = &report.healed_to {
            println!("Healed locator: {}", healed);
        }
        if let Some(text) = &report.text {
            println!("Text: {}", text);
        }
    }
    Ok(())
}
