use super::env::CliArgs;
use super::heal::cmd_heal;
use super::info::cmd_info;
use super::ledger::cmd_ledger;
use super::replay::cmd_replay;
use super::similarity::cmd_similarity;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Heal(args) => cmd_heal(args, ctx).await,
        Commands::Ledger(args) => cmd_ledger(args, ctx).await,
        Commands::Similarity(args) => cmd_similarity(args, ctx),
        Commands::Replay(args) => cmd_replay(args, ctx).await,
        Commands::Info => cmd_info(ctx),
    }
}
