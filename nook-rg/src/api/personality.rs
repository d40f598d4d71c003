//! Personality inference API handlers
//!
//! POST /personality-products

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::services::personality::{self, InferenceError};
use crate::AppState;
use nook_common::types::{ProductIdea, SurveyAnswer};

/// POST /personality-products request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityProductsRequest {
    #[serde(default)]
    pub user_answers: Option<Vec<SurveyAnswer>>,
}

/// POST /personality-products response
#[derive(Debug, Serialize)]
pub struct PersonalityProductsResponse {
    pub personality: Value,
    pub products: Vec<ProductIdea>,
}

/// POST /personality-products
///
/// Infers a personality profile plus exactly six product ideas from the
/// user's answered survey questions.
pub async fn personality_products(
    State(state): State<AppState>,
    Json(request): Json<PersonalityProductsRequest>,
) -> ApiResult<Json<PersonalityProductsResponse>> {
    let answers = request.user_answers.unwrap_or_default();
    if answers.is_empty() {
        return Err(ApiError::bad_request("invalid_payload"));
    }

    let model = &state.config.openai.profile_model;
    match personality::infer(&state.openai, model, &answers).await {
        Ok(outcome) => Ok(Json(PersonalityProductsResponse {
            personality: outcome.personality,
            products: outcome.products,
        })),
        Err(InferenceError::BadShape) => Err(ApiError::bad_gateway("bad_llm_output", "")),
        Err(err) => {
            tracing::error!(error = %err, "personality inference failed");
            Err(ApiError::failed("llm_failed", err.to_string()))
        }
    }
}

/// Build personality routes
pub fn personality_routes() -> Router<AppState> {
    Router::new().route("/personality-products", post(personality_products))
}
