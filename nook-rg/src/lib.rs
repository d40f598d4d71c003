//! nook-rg library interface
//!
//! Room generation service: turns survey answers into a personality
//! profile, product ideas, and a composited room image via external text
//! and image generation backends. Exposes the router and state for
//! integration testing.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use nook_common::config::NookConfig;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{ImageFetcher, OpenAiClient, RoomStore};

/// Image payloads arrive base64-encoded inside JSON bodies; admit them.
const MAX_BODY_BYTES: usize = 15 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NookConfig>,
    /// Text and image generation backend client
    pub openai: OpenAiClient,
    /// Reference and product image downloader
    pub fetcher: ImageFetcher,
    /// In-memory room records, alive for the process lifetime
    pub rooms: RoomStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: NookConfig) -> anyhow::Result<Self> {
        let openai = OpenAiClient::new(&config.openai)?;
        let fetcher = ImageFetcher::new()?;
        Ok(Self {
            config: Arc::new(config),
            openai,
            fetcher,
            rooms: RoomStore::new(),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::personality_routes())
        .merge(api::generation_routes())
        .merge(api::phased_routes())
        .merge(api::room_routes())
        .merge(api::daily_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
