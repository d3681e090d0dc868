//! tbctl - terminal admin console for ThingsBoard-compatible IoT platforms.
//!
//! Architecture:
//! - One session per process owns the environment registry and credentials
//! - Only the environment registry is persisted; tokens die with the process
//! - All platform access goes through per-environment request handles

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tbctl::cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    execute(cli).await
}
