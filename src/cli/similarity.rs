use action_locator::{exceeds_threshold, similarity, HEAL_THRESHOLD};
use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::CliContext;

#[derive(Args, Clone, Debug)]
pub struct SimilarityArgs {
    /// First string
    pub a: String,

    /// Second string
    pub b: String,
}

#[derive(Serialize)]
struct SimilarityReport<'a> {
    a: &'a str,
    b: &'a str,
    score: f64,
    threshold: f64,
    accepted: bool,
}

pub fn cmd_similarity(args: SimilarityArgs, ctx: &CliContext) -> Result<()> {
    let score = similarity(&args.a, &args.b);
    let report = SimilarityReport {
        a: &args.a,
        b: &args.b,
        score,
        threshold: HEAL_THRESHOLD,
        accepted: exceeds_threshold(score),
    };

    if !ctx.output().emit(&report)? {
        println!("Similarity: {:.4}", report.score);
        println!(
            "Heal threshold ({}): {}",
            report.threshold,
            if report.accepted { "accepted" } else { "rejected" }
        );
    }
    Ok(())
}
