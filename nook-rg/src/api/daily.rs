//! Daily question API handlers
//!
//! POST /generate-daily-questions

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::services::daily::{self, DailyError};
use crate::AppState;
use nook_common::types::{DailyQuestionSet, SurveyAnswer};

/// POST /generate-daily-questions request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuestionsRequest {
    #[serde(default)]
    pub user_answers: Option<Vec<SurveyAnswer>>,
    #[serde(default)]
    pub previous_daily_questions: Vec<DailyQuestionSet>,
}

/// POST /generate-daily-questions
///
/// Generates three fresh personalized questions, distinct from everything
/// in the supplied history. Identical inputs may produce different output;
/// the backend runs warm.
pub async fn generate_daily_questions(
    State(state): State<AppState>,
    Json(request): Json<DailyQuestionsRequest>,
) -> ApiResult<Json<Value>> {
    let answers = request.user_answers.unwrap_or_default();
    if answers.is_empty() {
        return Err(ApiError::bad_request("userAnswers is required"));
    }

    let model = &state.config.openai.question_model;
    let outcome = daily::generate_questions(
        &state.openai,
        model,
        &answers,
        &request.previous_daily_questions,
    )
    .await
    .map_err(|err| match err {
        DailyError::EmptyResponse => ApiError::failed("no_response_from_openai", ""),
        DailyError::Invalid { raw } => {
            tracing::error!("daily question output failed to parse");
            ApiError::InvalidAiResponse { raw }
        }
        DailyError::Backend(inner) => {
            tracing::error!(error = %inner, "daily question generation failed");
            ApiError::failed("generation_failed", inner.to_string())
        }
    })?;

    // The parsed payload passes through with the bookkeeping fields added.
    let mut body = outcome.payload;
    body.insert("generatedAt".to_string(), json!(outcome.generated_at));
    body.insert("userTags".to_string(), json!(outcome.user_tags));
    Ok(Json(Value::Object(body)))
}

/// Build daily question routes
pub fn daily_routes() -> Router<AppState> {
    Router::new().route("/generate-daily-questions", post(generate_daily_questions))
}
