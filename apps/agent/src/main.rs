use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use checkup::{BatchRunner, ProbeExecutor};
use clap::Parser;
use logger::init_tracing;
use tracing::info;

mod client;
mod config;
mod runner;

use client::ProtocolClient;
use config::Config;
use runner::AgentRunner;

#[derive(Debug, Parser)]
#[command(version, about = "Checkup remote probe agent")]
struct Cli {
    /// Path to agent.toml, defaults to $XDG_CONFIG_HOME/checkup/agent.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single cycle regardless of the configured interval
    #[arg(long)]
    once: bool,

    /// Print the resolved configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref()).context("loading agent config")?;

    if cli.print_config {
        print!("{config}");
        return Ok(());
    }

    let Some(secret) = config.worker_secret.clone().filter(|s| !s.is_empty()) else {
        bail!("WORKER_SECRET is not set");
    };

    let client = ProtocolClient::new(&config.api_base, secret, config.request_timeout())?;
    let executor = Arc::new(ProbeExecutor::new(config.timeout())?);
    let agent = AgentRunner::new(client, BatchRunner::new(executor));

    match config.interval().filter(|_| !cli.once) {
        Some(period) => {
            let interval_seconds = period.as_secs();
            info!(api_base = %config.api_base, interval_seconds, "Starting agent");
            agent.run_every(period).await;
        }
        None => {
            let cycle = agent.run_once().await?;
            info!(pulled = cycle.pulled, processed = cycle.processed, "Single cycle complete");
        }
    }

    Ok(())
}
