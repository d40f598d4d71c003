//! nook-rg - Room Generation Service
//!
//! Turns survey answers into a personality profile, curated product ideas,
//! and a composited room image. Talks to external text/image generation
//! backends; keeps generated room records in memory.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use nook_rg::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting nook-rg (Room Generation) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = nook_common::config::load_config()?;
    let port = config.port;

    let state = AppState::new(config)?;
    let app = nook_rg::build_router(state);

    // Bind all interfaces: clients reach the dev server across the LAN
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on http://0.0.0.0:{port}");
    info!("Health check: http://127.0.0.1:{port}/health");

    axum::serve(listener, app).await?;

    Ok(())
}
