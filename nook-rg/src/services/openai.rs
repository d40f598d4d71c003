//! Text and image generation backend client
//!
//! Thin client over the chat-completions and images generations/edits
//! endpoints. Failures are surfaced to the caller untouched; no retries
//! happen at this layer.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use nook_common::config::OpenAiConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("nook-rg/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const ERROR_BODY_LIMIT: usize = 512;

/// Backend client errors
#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("model response contained no image data")]
    MissingImage,

    #[error("image payload decode failed: {0}")]
    Decode(String),
}

/// One chat message in a completion request.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Chat-completion request parameters.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    /// Constrain the backend to emit a single JSON object.
    pub fn json_object() -> Self {
        Self {
            kind: "json_object",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

/// An input image for an edit call: raw bytes plus the multipart metadata
/// derived from the downloaded content type.
#[derive(Debug)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: &'static str,
}

/// Backend API client
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, OpenAiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| OpenAiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Run a chat completion, returning the first choice's content.
    ///
    /// `Ok(None)` means the backend answered without content; callers decide
    /// whether that is an error for their contract.
    pub async fn chat_completion(
        &self,
        request: ChatRequest<'_>,
    ) -> Result<Option<String>, OpenAiError> {
        let endpoint = format!("{}/chat/completions", self.api_base);
        tracing::debug!(model = request.model, "chat completion request");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| OpenAiError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OpenAiError::Network(e.to_string()))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }

    /// Text-to-image generation. Returns decoded PNG bytes.
    pub async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
        size: &str,
    ) -> Result<Vec<u8>, OpenAiError> {
        let endpoint = format!("{}/images/generations", self.api_base);
        tracing::debug!(model, size, "image generation request");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": model,
                "prompt": prompt,
                "size": size,
            }))
            .send()
            .await
            .map_err(|e| OpenAiError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed: ImagesResponse = response
            .json()
            .await
            .map_err(|e| OpenAiError::Network(e.to_string()))?;
        first_image(parsed)
    }

    /// Image edit with one or more input images. Returns decoded PNG bytes.
    pub async fn edit_image(
        &self,
        model: &str,
        prompt: &str,
        images: Vec<SourceImage>,
        size: &str,
        transparent_background: bool,
    ) -> Result<Vec<u8>, OpenAiError> {
        let endpoint = format!("{}/images/edits", self.api_base);
        tracing::debug!(model, size, count = images.len(), "image edit request");

        let mut form = reqwest::multipart::Form::new()
            .text("model", model.to_string())
            .text("prompt", prompt.to_string())
            .text("size", size.to_string());
        if transparent_background {
            form = form.text("background", "transparent");
        }
        for image in images {
            let part = reqwest::multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(image.mime)
                .map_err(|e| OpenAiError::Network(e.to_string()))?;
            form = form.part("image[]", part);
        }

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| OpenAiError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed: ImagesResponse = response
            .json()
            .await
            .map_err(|e| OpenAiError::Network(e.to_string()))?;
        first_image(parsed)
    }
}

/// Map a non-success status to an API error carrying a truncated body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OpenAiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OpenAiError::Api(status.as_u16(), truncate(&body, ERROR_BODY_LIMIT)))
}

fn first_image(response: ImagesResponse) -> Result<Vec<u8>, OpenAiError> {
    let b64 = response
        .data
        .into_iter()
        .find_map(|item| item.b64_json)
        .ok_or(OpenAiError::MissingImage)?;
    BASE64
        .decode(b64.as_bytes())
        .map_err(|e| OpenAiError::Decode(e.to_string()))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        text.to_string()
    } else {
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_omits_absent_options() {
        let request = ChatRequest {
            model: "gpt-4o",
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("usr")],
            temperature: 0.5,
            max_tokens: None,
            response_format: Some(ResponseFormat::json_object()),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("max_tokens").is_none());
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "system");
    }

    #[test]
    fn first_image_decodes_b64_payload() {
        let response = ImagesResponse {
            data: vec![ImageDatum {
                b64_json: Some(BASE64.encode(b"png-bytes")),
            }],
        };
        assert_eq!(first_image(response).unwrap(), b"png-bytes");
    }

    #[test]
    fn first_image_without_data_is_missing_image() {
        let response = ImagesResponse { data: Vec::new() };
        assert!(matches!(first_image(response), Err(OpenAiError::MissingImage)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 512), "short");
        let truncated = truncate(&"é".repeat(600), 512);
        assert!(truncated.ends_with("..."));
    }
}
