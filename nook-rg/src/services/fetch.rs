//! Remote image download
//!
//! Fetches reference and product photos by URL, keeping the served content
//! type so uploads re-encode under the right extension.

use crate::services::openai::SourceImage;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("nook-rg/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Image download errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),
}

/// A downloaded image with its served content type.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl FetchedImage {
    /// File extension for the outbound multipart field name. Only affects
    /// upload correctness, nothing else.
    pub fn extension(&self) -> &'static str {
        if self.content_type.contains("png") {
            "png"
        } else if self.content_type.contains("webp") {
            "webp"
        } else {
            "jpg"
        }
    }

    /// Convert into an edit-call input named `<stem>.<ext>`.
    pub fn into_source(self, stem: &str) -> SourceImage {
        let extension = self.extension();
        let mime = match extension {
            "png" => "image/png",
            "webp" => "image/webp",
            _ => "image/jpeg",
        };
        SourceImage {
            file_name: format!("{stem}.{extension}"),
            mime,
            bytes: self.bytes,
        }
    }
}

/// Remote image fetcher
#[derive(Clone)]
pub struct ImageFetcher {
    http: reqwest::Client,
}

impl ImageFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { http })
    }

    /// Download `url`, returning raw bytes and the served content type.
    /// Non-success statuses are errors; no body is read for them.
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?
            .to_vec();

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
