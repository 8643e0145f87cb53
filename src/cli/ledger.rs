use std::path::PathBuf;

use action_locator::{HealingLedger, JsonFileLedger};
use anyhow::Result;
use clap::Args;

use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct LedgerArgs {
    /// Ledger file (defaults to healing.ledger_path)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Show every recorded entry instead of the latest per locator
    #[arg(long)]
    pub history: bool,
}

pub async fn cmd_ledger(args: LedgerArgs, ctx: &CliContext) -> Result<()> {
    let path = args
        .path
        .unwrap_or_else(|| ctx.config().healing.ledger_path.clone());
    let ledger = JsonFileLedger::new(&path);

    if args.history {
        let history = ledger.history();
        if !ctx.output().emit(&history)? {
            if history.is_empty() {
                println!("No healing entries in {}", path.display());
            }
            for (key, entries) in &history {
                println!("{} ({} entries)", key, entries.len());
                for entry in entries {
                    println!(
                        "  {} -> {} (score {:.4})",
                        entry.discovered().to_rfc3339(),
                        entry.healed(),
                        entry.score()
                    );
                }
            }
        }
        return Ok(());
    }

    let latest = ledger.load();
    if !ctx.output().emit(&latest)? {
        if latest.is_empty() {
            println!("No healing entries in {}", path.display());
        }
        for (key, entry) in &latest {
            println!("{} -> {} (score {:.4})", key, entry.healed(), entry.score());
        }
    }
    Ok(())
}
