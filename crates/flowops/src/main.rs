mod cli;
mod runtime;
mod telemetry;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();
    cli.execute().await
}
