use clap::Subcommand;

use super::heal::HealArgs;
use super::ledger::LedgerArgs;
use super::replay::ReplayArgs;
use super::similarity::SimilarityArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Propose a healed locator against a saved UI snapshot
    Heal(HealArgs),

    /// Show the healing ledger
    Ledger(LedgerArgs),

    /// Score the similarity of two strings
    Similarity(SimilarityArgs),

    /// Run one action through the executor against a saved UI snapshot
    Replay(ReplayArgs),

    /// Show version, build and configuration information
    Info,
}
