//! queue-sim CLI
//!
//! Runs single-server and Able/Baker simulations locally or serves them over HTTP.

use clap::Parser;

use queue_simulator::cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}
