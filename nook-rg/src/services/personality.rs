//! Personality and product inference
//!
//! Sends the user's answered survey questions to the chat backend and parses
//! a strict-JSON profile plus exactly six product ideas out of the reply.
//! The parse layer self-heals against prose-wrapped output by extracting the
//! first balanced brace block before giving up.

use crate::services::openai::{ChatMessage, ChatRequest, OpenAiClient, OpenAiError, ResponseFormat};
use nook_common::tags::{top_tags, TOP_TAG_COUNT};
use nook_common::types::{ProductIdea, SurveyAnswer};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// Every inference call returns exactly this many products.
pub const PRODUCT_COUNT: usize = 6;

const INFERENCE_TEMPERATURE: f32 = 0.5;

const SYSTEM_PROMPT: &str = r#"You are an interior stylist and product curator for bedroom setups. Given user Q&A pairs and tags, infer a concise personality and propose exactly 6 purchasable bedroom product ideas.
Return STRICT JSON only matching this schema:
{
  "personality": {"label": "string","description": "string","palette": ["string","string","string"],"vibe": "string","materials": ["string","string"],"budget": "LOW|MID|HIGH"},
  "products": [{"name":"string","searchQuery":"string","category":"BED|DESK|LAMP|RUG|WALL_ART|PLANT|STORAGE|DECOR|CHAIR|BEDDING","styleHints":["string"],"colorHints":["string"],"rationale":"string"}]
}"#;

/// Inference errors
#[derive(Debug, Error)]
pub enum InferenceError {
    /// No JSON object could be recovered from the model output
    #[error("no_json")]
    NoJson,

    /// The output parsed but is missing the personality object or the
    /// products array
    #[error("model output missing personality object or products array")]
    BadShape,

    #[error(transparent)]
    Backend(#[from] OpenAiError),
}

/// Parsed inference result: the profile passes through as validated JSON,
/// the products are coerced into the typed contract.
#[derive(Debug)]
pub struct InferenceOutcome {
    pub personality: Value,
    pub products: Vec<ProductIdea>,
}

/// Infer a personality profile and product ideas from survey answers.
///
/// The caller guarantees `answers` is non-empty.
pub async fn infer(
    openai: &OpenAiClient,
    model: &str,
    answers: &[SurveyAnswer],
) -> Result<InferenceOutcome, InferenceError> {
    let tags = top_tags(answers, TOP_TAG_COUNT);
    let context = build_context(answers, &tags);
    tracing::debug!(answer_count = answers.len(), top_tags = ?tags, "running inference");

    let content = openai
        .chat_completion(ChatRequest {
            model,
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(context),
            ],
            temperature: INFERENCE_TEMPERATURE,
            max_tokens: None,
            response_format: Some(ResponseFormat::json_object()),
        })
        .await?
        .unwrap_or_default();

    parse_outcome(&content)
}

fn build_context(answers: &[SurveyAnswer], tags: &[String]) -> String {
    let answer_lines = answers
        .iter()
        .map(|a| format!("{} (tags: {})", a.choice_text, a.tags.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    format!("Top tags: {}\nAnswers: {}", tags.join(", "), answer_lines)
}

/// Parse model output into an [`InferenceOutcome`].
///
/// Recovery order: direct JSON parse, then the first balanced `{...}` block.
/// Shape validation and the pad-to-six product invariant live here so the
/// transport layer stays untouched by contract rules.
pub fn parse_outcome(text: &str) -> Result<InferenceOutcome, InferenceError> {
    let data: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            let fragment = extract_json_object(text).ok_or(InferenceError::NoJson)?;
            serde_json::from_str(fragment).map_err(|_| InferenceError::NoJson)?
        }
    };

    let personality = data
        .get("personality")
        .filter(|p| p.is_object())
        .cloned()
        .ok_or(InferenceError::BadShape)?;
    let raw_products = data
        .get("products")
        .and_then(Value::as_array)
        .ok_or(InferenceError::BadShape)?;

    let mut products: Vec<ProductIdea> = raw_products
        .iter()
        .take(PRODUCT_COUNT)
        .map(coerce_product)
        .collect();
    while products.len() < PRODUCT_COUNT {
        products.push(ProductIdea::default_lamp());
    }

    Ok(InferenceOutcome {
        personality,
        products,
    })
}

/// Greedy first-to-last brace span, the widest candidate JSON object.
fn extract_json_object(text: &str) -> Option<&str> {
    static BRACE_BLOCK: OnceLock<Regex> = OnceLock::new();
    let re = BRACE_BLOCK.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));
    re.find(text).map(|m| m.as_str())
}

fn coerce_product(value: &Value) -> ProductIdea {
    let string_field = |key: &str| -> String {
        value
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let list_field = |key: &str| -> Vec<String> {
        value
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };

    let name = string_field("name");
    let mut search_query = string_field("searchQuery");
    if search_query.is_empty() {
        search_query = name.clone();
    }

    ProductIdea {
        search_query,
        category: string_field("category"),
        style_hints: list_field("styleHints"),
        color_hints: list_field("colorHints"),
        rationale: string_field("rationale"),
        name,
    }
}
