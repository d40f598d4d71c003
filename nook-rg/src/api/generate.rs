//! One-shot room generation API handlers
//!
//! POST /generate-room

use axum::{extract::State, routing::post, Json, Router};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::base_room;
use crate::services::compose::to_data_uri;
use crate::services::openai::OpenAiError;
use crate::AppState;
use nook_common::config::normalize_image_model;

const GENERATED_SIZE: &str = "1024x1024";

/// POST /generate-room request. Diffusion-tuning fields sent by older
/// clients (steps, guidance, boxes) are accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoomRequest {
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub seed: Option<i64>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub model: Option<String>,
}

/// POST /generate-room response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoomResponse {
    pub image_url: String,
    pub seed: i64,
}

/// POST /generate-room
///
/// Generates a room image, seeding an edit call with any supplied reference
/// images and falling back to plain generation.
pub async fn generate_room(
    State(state): State<AppState>,
    Json(request): Json<GenerateRoomRequest>,
) -> ApiResult<Json<GenerateRoomResponse>> {
    let prompt = match request.prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(ApiError::bad_request("prompt is required")),
    };
    let seed = request.seed.unwrap_or_else(random_seed);
    let model = request
        .model
        .map(|m| normalize_image_model(&m))
        .unwrap_or_else(|| state.config.openai.image_model.clone());

    tracing::info!(
        seed,
        model = %model,
        references = request.image_urls.len(),
        "generating room image"
    );

    let result = base_room::generate_base(
        &state.openai,
        &state.fetcher,
        &model,
        &prompt,
        request.negative_prompt.as_deref(),
        &request.image_urls,
        GENERATED_SIZE,
    )
    .await;

    match result {
        Ok(bytes) => Ok(Json(GenerateRoomResponse {
            image_url: to_data_uri(&bytes),
            seed,
        })),
        Err(err @ (OpenAiError::MissingImage | OpenAiError::Decode(_))) => {
            Err(ApiError::bad_gateway("no_image_returned", err.to_string()))
        }
        Err(err) => {
            tracing::error!(error = %err, "room generation failed");
            Err(ApiError::failed("generation_failed", err.to_string()))
        }
    }
}

/// Default seed matching the original client range.
fn random_seed() -> i64 {
    rand::thread_rng().gen_range(0..10_000_000)
}

/// Build generation routes
pub fn generation_routes() -> Router<AppState> {
    Router::new().route("/generate-room", post(generate_room))
}
