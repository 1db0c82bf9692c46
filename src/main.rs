mod analytics;
mod api;
mod charts;
mod config;
mod error;
mod loader;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::loader::Datasets;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Datasets: loaded once, read-only afterwards ---
    let load_cfg = cfg.clone();
    let data = tokio::task::spawn_blocking(move || Datasets::load(&load_cfg))
        .await
        .map_err(|e| std::io::Error::other(format!("dataset loader panicked: {e}")))?;

    let missing: Vec<&str> = data
        .status()
        .iter()
        .filter(|s| !s.loaded)
        .map(|s| s.table)
        .collect();
    if !missing.is_empty() {
        warn!("Serving without {}; dependent views will report no data", missing.join(", "));
    }

    // --- HTTP API server ---
    let api_state = ApiState { data: Arc::new(data) };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
