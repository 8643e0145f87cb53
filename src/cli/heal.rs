use std::path::PathBuf;

use action_locator::{DefaultLocatorHealer, HealingLedger, JsonFileLedger, LocatorHealer};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use soulharness_core_types::Locator;
use tracing::info;

use super::locator::{load_snapshot, parse_locator};
use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct HealArgs {
    /// UI snapshot (JSON document tree)
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Locator strategy of the failed locator (id, xpath, name, ...)
    #[arg(long)]
    pub strategy: String,

    /// Selector value of the failed locator
    #[arg(long)]
    pub value: String,

    /// Append the proposal to the healing ledger
    #[arg(long)]
    pub record: bool,

    /// Ledger file (defaults to healing.ledger_path)
    #[arg(long, value_name = "FILE")]
    pub ledger: Option<PathBuf>,
}

#[derive(Serialize)]
struct HealReport {
    original: Locator,
    healed: Option<Locator>,
    attribute: Option<String>,
    matched_value: Option<String>,
    score: Option<f64>,
    recorded: bool,
}

pub async fn cmd_heal(args: HealArgs, ctx: &CliContext) -> Result<()> {
    let original = parse_locator(&args.strategy, &args.value)?;
    let snapshot = load_snapshot(&args.snapshot).await?;
    let proposal = DefaultLocatorHealer::new().heal(&original, &snapshot);

    let mut recorded = false;
    if let (Some(proposal), true) = (&proposal, args.record) {
        let path = args
            .ledger
            .clone()
            .unwrap_or_else(|| ctx.config().healing.ledger_path.clone());
        let ledger = JsonFileLedger::new(&path);
        ledger
            .record(proposal.to_entry()?)
            .with_context(|| format!("Failed to record heal in {}", path.display()))?;
        info!(ledger = %path.display(), "Heal recorded");
        recorded = true;
    }

    let report = HealReport {
        original: original.clone(),
        healed: proposal.as_ref().map(|p| p.healed.clone()),
        attribute: proposal.as_ref().map(|p| p.attribute.to_string()),
        matched_value: proposal.as_ref().map(|p| p.matched_value.clone()),
        score: proposal.as_ref().map(|p| p.score),
        recorded,
    };

    if !ctx.output().emit(&report)? {
        match &proposal {
            Some(proposal) => {
                println!("Original: {}", proposal.original);
                println!("Healed:   {}", proposal.healed);
                println!(
                    "Matched {}='{}' (score {:.4})",
                    proposal.attribute, proposal.matched_value, proposal.score
                );
                if recorded {
                    println!("Recorded in healing ledger");
                }
            }
            None => println!("No heal candidate above threshold for {}", original),
        }
    }
    Ok(())
}
