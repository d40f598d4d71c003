//! Base room image generation
//!
//! Primary strategy: an image-edit call seeded with downloaded reference
//! images. Fallback strategy: plain text-to-image generation. The fallback
//! fires only on three enumerated conditions: the reference list was empty,
//! every reference download failed, or the edit call itself failed. A
//! response that arrives without image data is a hard failure on either
//! path, never retried.

use crate::services::fetch::ImageFetcher;
use crate::services::openai::{OpenAiClient, OpenAiError, SourceImage};
use tracing::warn;

/// At most this many reference images seed an edit call.
pub const MAX_REFERENCE_IMAGES: usize = 6;

/// Append the negative prompt in `Avoid:` form when present.
pub fn combined_prompt(prompt: &str, negative_prompt: Option<&str>) -> String {
    match negative_prompt {
        Some(negative) if !negative.trim().is_empty() => {
            format!("{prompt}\nAvoid: {negative}")
        }
        _ => prompt.to_string(),
    }
}

/// Append the palette hint used by the phased pipeline when present.
pub fn palette_prompt(prompt: &str, palette_hint: Option<&str>) -> String {
    match palette_hint {
        Some(palette) if !palette.trim().is_empty() => {
            format!("{prompt} (palette: {palette})")
        }
        _ => prompt.to_string(),
    }
}

/// Download up to [`MAX_REFERENCE_IMAGES`] references, skipping any that
/// fail without aborting the rest.
pub async fn fetch_references(fetcher: &ImageFetcher, urls: &[String]) -> Vec<SourceImage> {
    let mut sources = Vec::new();
    for (index, url) in urls.iter().take(MAX_REFERENCE_IMAGES).enumerate() {
        match fetcher.fetch(url).await {
            Ok(image) => sources.push(image.into_source(&format!("ref-{index}"))),
            Err(err) => warn!(url = %url, error = %err, "skipping reference image"),
        }
    }
    sources
}

/// Generate the base room image, preferring an edit seeded with references.
pub async fn generate_base(
    openai: &OpenAiClient,
    fetcher: &ImageFetcher,
    model: &str,
    prompt: &str,
    negative_prompt: Option<&str>,
    reference_urls: &[String],
    size: &str,
) -> Result<Vec<u8>, OpenAiError> {
    let full_prompt = combined_prompt(prompt, negative_prompt);

    if !reference_urls.is_empty() {
        let references = fetch_references(fetcher, reference_urls).await;
        if !references.is_empty() {
            match openai
                .edit_image(model, &full_prompt, references, size, false)
                .await
            {
                Ok(bytes) => return Ok(bytes),
                // Missing or undecodable image data is a contract violation,
                // not a transport hiccup: surface it instead of regenerating.
                Err(err @ (OpenAiError::MissingImage | OpenAiError::Decode(_))) => {
                    return Err(err)
                }
                Err(err) => {
                    warn!(error = %err, "image edit failed, falling back to text-to-image")
                }
            }
        }
    }

    openai.generate_image(model, &full_prompt, size).await
}
