use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use checkup::pool::open_local_pool;
use checkup::{Engine, LibsqlStore, ProbeExecutor, initialize_database};
use clap::Parser;
use logger::init_tracing;
use tracing::{info, warn};

mod auth;
mod config;
mod error;
mod routes;
mod state;

use config::Config;
use state::AppState;

#[derive(Debug, Parser)]
#[command(version, about = "Checkup server: target registry, check cycles and agent protocol")]
struct Cli {
    /// Path to server.toml, defaults to $XDG_CONFIG_HOME/checkup/server.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the resolved configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref()).context("loading server config")?;

    if cli.print_config {
        print!("{config}");
        return Ok(());
    }

    if config.auth.cron_secret.as_deref().is_none_or(str::is_empty) {
        warn!("CRON_SECRET is not set, /api/cron will reject every call");
    }
    if config.auth.worker_secret.as_deref().is_none_or(str::is_empty) {
        warn!("WORKER_SECRET is not set, agent endpoints will reject every call");
    }

    let pool = open_local_pool(&config.database.path, config.database.pool_size)
        .await
        .with_context(|| format!("opening database at {}", config.database.path))?;
    initialize_database(&pool).await.context("initializing schema")?;

    let store = Arc::new(LibsqlStore::new_from_pool(pool));
    let executor = Arc::new(ProbeExecutor::new(config.probe.timeout())?);
    let engine = Arc::new(Engine::new(store, executor));

    if let Some(period) = config.scheduler.interval() {
        info!(interval_seconds = period.as_secs(), "Starting in-process sweep ticker");
        engine.start_periodic_sweep(period);
    }

    let state = web::Data::new(AppState::new(engine, &config.auth));
    let payload = routes::payload_config(&config.http);
    let address = config.address();
    info!(%address, "Starting HTTP server");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(payload.clone())
            .configure(routes::routes)
    })
    .bind(&address)
    .with_context(|| format!("binding {address}"))?
    .run()
    .await?;

    Ok(())
}
