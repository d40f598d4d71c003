//! Room record API handlers
//!
//! POST /rooms, GET /rooms/:id, POST /rooms/:id/share, GET /slots

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::services::NewRoom;
use crate::AppState;
use nook_common::types::{default_slots, NormalizedBox, RoomRecord};

/// POST /rooms request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub seed: Option<i64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub boxes: Option<Vec<NormalizedBox>>,
    #[serde(default)]
    pub product_ids: Option<Vec<String>>,
    #[serde(default)]
    pub personality_type: Option<String>,
    #[serde(default)]
    pub theme: Option<serde_json::Value>,
}

/// POST /rooms response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// POST /rooms/:id/share response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRoomResponse {
    pub share_token: String,
}

/// GET /slots response
#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub boxes: Vec<NormalizedBox>,
}

/// POST /rooms
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<CreateRoomRequest>,
) -> ApiResult<Json<CreateRoomResponse>> {
    let (Some(seed), Some(image_url)) = (request.seed, request.image_url) else {
        return Err(ApiError::bad_request_with(
            "invalid_payload",
            "seed and imageUrl are required",
        ));
    };
    if image_url.is_empty() {
        return Err(ApiError::bad_request_with(
            "invalid_payload",
            "seed and imageUrl are required",
        ));
    }

    let room_id = state
        .rooms
        .create(NewRoom {
            seed,
            image_url,
            boxes: request.boxes,
            product_ids: request.product_ids,
            personality_type: request.personality_type,
            theme: request.theme,
        })
        .await;
    tracing::info!(room_id = %room_id, "room stored");

    Ok(Json(CreateRoomResponse { room_id }))
}

/// GET /rooms/:id
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<RoomRecord>> {
    match state.rooms.get(&id).await {
        Some(room) => Ok(Json(room)),
        None => Err(ApiError::NotFound),
    }
}

/// POST /rooms/:id/share
pub async fn share_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ShareRoomResponse>> {
    match state.rooms.issue_share_token(&id).await {
        Some(share_token) => Ok(Json(ShareRoomResponse { share_token })),
        None => Err(ApiError::NotFound),
    }
}

/// GET /slots
///
/// The static UI hotspot catalog. Unrelated to the composer's sprite
/// anchors.
pub async fn slots() -> Json<SlotsResponse> {
    Json(SlotsResponse {
        boxes: default_slots(),
    })
}

/// Build room routes
pub fn room_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/:id", get(get_room))
        .route("/rooms/:id/share", post(share_room))
        .route("/slots", get(slots))
}
