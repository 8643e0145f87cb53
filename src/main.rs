use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    soulharness_cli::cli::run().await
}
