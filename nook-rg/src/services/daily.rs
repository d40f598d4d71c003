//! Daily question generation
//!
//! Synthesizes fresh personalized check-in questions from prior answers and
//! the question history. Output is parsed after stripping an optional
//! Markdown code fence; identical inputs are not guaranteed identical output
//! (the backend runs at temperature 0.8), which is accepted.

use crate::services::openai::{ChatMessage, ChatRequest, OpenAiClient, OpenAiError};
use chrono::{SecondsFormat, Utc};
use nook_common::tags::{top_tags, TOP_TAG_COUNT};
use nook_common::types::{DailyQuestionSet, SurveyAnswer};
use serde_json::{Map, Value};
use thiserror::Error;

const QUESTION_TEMPERATURE: f32 = 0.8;
const QUESTION_MAX_TOKENS: u32 = 1500;

const SYSTEM_PROMPT: &str =
    "You are an expert at creating personalized survey questions. Always respond with valid JSON only.";

/// Question generation errors
#[derive(Debug, Error)]
pub enum DailyError {
    /// The backend answered with no content at all
    #[error("no_response_from_openai")]
    EmptyResponse,

    /// The backend text could not be parsed into a `questions` array;
    /// carries the raw text for diagnosis
    #[error("Failed to parse AI response")]
    Invalid { raw: String },

    #[error(transparent)]
    Backend(#[from] OpenAiError),
}

/// Generated questions plus the tag summary they were conditioned on.
#[derive(Debug)]
pub struct DailyOutcome {
    /// The parsed backend object, known to contain a `questions` array.
    pub payload: Map<String, Value>,
    pub user_tags: Vec<String>,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
}

/// Generate three fresh daily questions personalized to `answers`,
/// avoiding every question already present in `history`.
pub async fn generate_questions(
    openai: &OpenAiClient,
    model: &str,
    answers: &[SurveyAnswer],
    history: &[DailyQuestionSet],
) -> Result<DailyOutcome, DailyError> {
    let user_tags = top_tags(answers, TOP_TAG_COUNT);
    let prompt = build_prompt(answers, history, &user_tags);
    tracing::debug!(
        answer_count = answers.len(),
        history_days = history.len(),
        "generating daily questions"
    );

    let content = openai
        .chat_completion(ChatRequest {
            model,
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            temperature: QUESTION_TEMPERATURE,
            max_tokens: Some(QUESTION_MAX_TOKENS),
            response_format: None,
        })
        .await?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(DailyError::EmptyResponse)?;

    let payload = parse_questions(&content)?;

    Ok(DailyOutcome {
        payload,
        user_tags,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Parse backend text into an object holding a `questions` array.
pub fn parse_questions(content: &str) -> Result<Map<String, Value>, DailyError> {
    let clean = strip_code_fences(content);
    let parsed: Value = serde_json::from_str(clean).map_err(|_| DailyError::Invalid {
        raw: content.to_string(),
    })?;
    let object = parsed.as_object().cloned().ok_or_else(|| DailyError::Invalid {
        raw: content.to_string(),
    })?;
    if !object.get("questions").map(Value::is_array).unwrap_or(false) {
        return Err(DailyError::Invalid {
            raw: content.to_string(),
        });
    }
    Ok(object)
}

/// Remove exactly one wrapping ```json ... ``` or ``` ... ``` fence.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        if let Some(inner) = rest.strip_suffix("```") {
            return inner.trim();
        }
    }
    trimmed
}

fn build_prompt(
    answers: &[SurveyAnswer],
    history: &[DailyQuestionSet],
    tags: &[String],
) -> String {
    let answer_lines = answers
        .iter()
        .map(|a| format!("\"{}\" (tags: {})", a.choice_text, a.tags.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    let history_lines = history
        .iter()
        .map(|day| {
            let texts = day
                .questions
                .iter()
                .map(|q| q.text.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            format!("- {}: {}", day.date, texts)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are creating personalized daily check-in questions for a user based on their personality profile.

User's personality profile based on survey responses:
- Top personality tags: {tags}
- Full answers: {answers}

Previous daily questions asked (to avoid repetition):
{history}

Create exactly 3 new daily check-in questions that:
1. Are personalized to the user's personality tags and previous choices
2. Are different from any previously asked questions
3. Help understand their current mood/priorities/interests
4. Each question should have 2-4 multiple choice options
5. Each choice should include relevant personality tags for design recommendations

Return ONLY a JSON object with this exact structure:
{{
  "questions": [
    {{
      "id": "unique_question_id",
      "text": "Question text?",
      "choices": [
        {{
          "id": "unique_choice_id",
          "text": "Choice text",
          "tags": ["tag1", "tag2"]
        }}
      ]
    }}
  ]
}}

Make the questions feel fresh, engaging, and relevant to their personality. Focus on current mood, daily priorities, or design preferences that would help create their ideal room."#,
        tags = tags.join(", "),
        answers = answer_lines,
        history = history_lines,
    )
}
