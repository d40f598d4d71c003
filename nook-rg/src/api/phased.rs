//! Phased pipeline API handlers
//!
//! The phased endpoints expose the room pipeline one stage at a time so
//! clients can show progress: POST /base-room, POST /stylize-product,
//! POST /compose-final. POST /compose-room runs all stages server-side in
//! one call.

use axum::{extract::State, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::base_room::palette_prompt;
use crate::services::compose::{compose, decode_image_payload, to_data_uri};
use crate::services::openai::OpenAiError;
use crate::services::stylize::{self, MAX_SPRITES};
use crate::AppState;

const DEFAULT_SIZE: &str = "1024x1024";
const ALLOWED_SIZES: [&str; 3] = ["1024x1024", "1536x1024", "1024x1536"];

/// POST /base-room request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRoomRequest {
    pub prompt: Option<String>,
    pub palette_hint: Option<String>,
    pub size: Option<String>,
}

/// POST /base-room response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseRoomResponse {
    pub base_b64: String,
}

/// POST /stylize-product request
#[derive(Debug, Deserialize)]
pub struct StylizeProductRequest {
    pub url: Option<String>,
}

/// POST /stylize-product response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StylizeProductResponse {
    pub sprite_b64: String,
}

/// POST /compose-final request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeFinalRequest {
    pub base_b64: Option<String>,
    pub sprite_b64s: Option<Vec<String>>,
}

/// POST /compose-room request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRoomRequest {
    pub prompt: Option<String>,
    pub product_urls: Option<Vec<String>>,
    pub palette_hint: Option<String>,
    pub size: Option<String>,
}

/// Composed image response shared by /compose-final and /compose-room
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedImageResponse {
    pub image_url: String,
}

fn required_prompt(prompt: Option<&str>) -> ApiResult<String> {
    match prompt.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => Err(ApiError::bad_request("invalid_payload")),
    }
}

fn validated_size(size: Option<String>) -> ApiResult<String> {
    let size = size.unwrap_or_else(|| DEFAULT_SIZE.to_string());
    if ALLOWED_SIZES.contains(&size.as_str()) {
        Ok(size)
    } else {
        Err(ApiError::bad_request_with(
            "invalid_payload",
            format!("unsupported size: {size}"),
        ))
    }
}

/// `no_base_image` is the documented tag for a base generation that
/// answered without image data.
fn base_failure_message(err: &OpenAiError) -> String {
    match err {
        OpenAiError::MissingImage => "no_base_image".to_string(),
        other => other.to_string(),
    }
}

/// POST /base-room
///
/// Phase 1: generate the base room image alone, returned as raw base64 so
/// the client can render progress before sprites exist.
pub async fn base_room(
    State(state): State<AppState>,
    Json(request): Json<BaseRoomRequest>,
) -> ApiResult<Json<BaseRoomResponse>> {
    let prompt = required_prompt(request.prompt.as_deref())?;
    let size = validated_size(request.size)?;
    let full_prompt = palette_prompt(&prompt, request.palette_hint.as_deref());

    let model = &state.config.openai.image_model;
    match state.openai.generate_image(model, &full_prompt, &size).await {
        Ok(bytes) => Ok(Json(BaseRoomResponse {
            base_b64: BASE64.encode(bytes),
        })),
        Err(err) => {
            tracing::error!(error = %err, "base room generation failed");
            Err(ApiError::failed("base_failed", base_failure_message(&err)))
        }
    }
}

/// POST /stylize-product
///
/// Phase 2: convert one product photo into a transparent sprite. Invoked
/// once per product; each call fails independently.
pub async fn stylize_product(
    State(state): State<AppState>,
    Json(request): Json<StylizeProductRequest>,
) -> ApiResult<Json<StylizeProductResponse>> {
    let url = match request.url.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => return Err(ApiError::bad_request("invalid_payload")),
    };

    let model = &state.config.openai.image_model;
    match stylize::stylize_product(&state.openai, &state.fetcher, model, &url).await {
        Ok(bytes) => Ok(Json(StylizeProductResponse {
            sprite_b64: BASE64.encode(bytes),
        })),
        Err(err) => {
            tracing::error!(url = %url, error = %err, "product stylization failed");
            Err(ApiError::failed("stylize_failed", err.to_string()))
        }
    }
}

/// POST /compose-final
///
/// Phase 3: overlay the supplied sprites onto the base image and return the
/// finished room as a data URI.
pub async fn compose_final(
    State(_state): State<AppState>,
    Json(request): Json<ComposeFinalRequest>,
) -> ApiResult<Json<ComposedImageResponse>> {
    let (Some(base_b64), Some(sprite_b64s)) = (request.base_b64, request.sprite_b64s) else {
        return Err(ApiError::bad_request("invalid_payload"));
    };
    if base_b64.trim().is_empty() {
        return Err(ApiError::bad_request("invalid_payload"));
    }

    let compose_failed = |err: crate::services::ComposeError| {
        tracing::error!(error = %err, "composition failed");
        ApiError::failed("compose_failed", err.to_string())
    };

    let base = decode_image_payload(&base_b64).map_err(compose_failed)?;
    let mut sprites = Vec::with_capacity(sprite_b64s.len());
    for sprite in &sprite_b64s {
        sprites.push(decode_image_payload(sprite).map_err(compose_failed)?);
    }

    let png = compose(&base, &sprites).map_err(compose_failed)?;
    Ok(Json(ComposedImageResponse {
        image_url: to_data_uri(&png),
    }))
}

/// POST /compose-room
///
/// Runs the whole phased pipeline in one request: base generation,
/// sequential sprite stylization with per-item failure isolation, then
/// composition. A product that fails to stylize is skipped, never fatal.
pub async fn compose_room(
    State(state): State<AppState>,
    Json(request): Json<ComposeRoomRequest>,
) -> ApiResult<Json<ComposedImageResponse>> {
    let prompt = required_prompt(request.prompt.as_deref())?;
    let Some(product_urls) = request.product_urls else {
        return Err(ApiError::bad_request("invalid_payload"));
    };
    let size = validated_size(request.size)?;
    let full_prompt = palette_prompt(&prompt, request.palette_hint.as_deref());
    let model = &state.config.openai.image_model;

    let base = state
        .openai
        .generate_image(model, &full_prompt, &size)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "base room generation failed");
            ApiError::failed("compose_failed", base_failure_message(&err))
        })?;

    tracing::info!(
        products = product_urls.len(),
        attempting = product_urls.len().min(MAX_SPRITES),
        "stylizing product sprites"
    );
    let sprites = stylize::stylize_batch(&state.openai, &state.fetcher, model, &product_urls).await;

    let png = compose(&base, &sprites).map_err(|err| {
        tracing::error!(error = %err, "composition failed");
        ApiError::failed("compose_failed", err.to_string())
    })?;
    Ok(Json(ComposedImageResponse {
        image_url: to_data_uri(&png),
    }))
}

/// Build phased pipeline routes
pub fn phased_routes() -> Router<AppState> {
    Router::new()
        .route("/base-room", post(base_room))
        .route("/stylize-product", post(stylize_product))
        .route("/compose-final", post(compose_final))
        .route("/compose-room", post(compose_room))
}
