//! Product sprite stylization
//!
//! Converts a product photo into a transparent-background pixel-art sprite
//! via a single image-edit call. Each product is an independent attempt;
//! the batch form collects successes and skips failures so one bad product
//! never sinks a composition.

use crate::services::fetch::{FetchError, ImageFetcher};
use crate::services::openai::{OpenAiClient, OpenAiError};
use thiserror::Error;
use tracing::warn;

/// At most this many sprites are stylized for one composition.
pub const MAX_SPRITES: usize = 4;

const SPRITE_SIZE: &str = "1024x1024";
const STYLIZE_PROMPT: &str = "Convert this product into a clean isometric pixel-art sprite with transparent background, consistent with retro game style.";

/// Stylization errors
#[derive(Debug, Error)]
pub enum StylizeError {
    /// The product photo could not be downloaded; no fallback sprite exists
    #[error("product_fetch_failed")]
    ProductFetch(#[source] FetchError),

    /// The edit call answered without image data
    #[error("no_sprite_image")]
    NoSprite,

    #[error(transparent)]
    Backend(OpenAiError),
}

/// Stylize one product photo into a sprite.
pub async fn stylize_product(
    openai: &OpenAiClient,
    fetcher: &ImageFetcher,
    model: &str,
    url: &str,
) -> Result<Vec<u8>, StylizeError> {
    let fetched = fetcher.fetch(url).await.map_err(StylizeError::ProductFetch)?;
    let source = fetched.into_source("product");

    match openai
        .edit_image(model, STYLIZE_PROMPT, vec![source], SPRITE_SIZE, true)
        .await
    {
        Ok(bytes) => Ok(bytes),
        Err(OpenAiError::MissingImage) => Err(StylizeError::NoSprite),
        Err(err) => Err(StylizeError::Backend(err)),
    }
}

/// Stylize the first [`MAX_SPRITES`] URLs sequentially, collecting the
/// sprites that succeed and skipping the ones that fail.
pub async fn stylize_batch(
    openai: &OpenAiClient,
    fetcher: &ImageFetcher,
    model: &str,
    urls: &[String],
) -> Vec<Vec<u8>> {
    let mut sprites = Vec::new();
    for url in urls.iter().take(MAX_SPRITES) {
        match stylize_product(openai, fetcher, model, url).await {
            Ok(sprite) => sprites.push(sprite),
            Err(err) => warn!(url = %url, error = %err, "sprite stylization failed, skipping"),
        }
    }
    sprites
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylize_errors_display_stable_tags() {
        let fetch = StylizeError::ProductFetch(FetchError::Status(404));
        assert_eq!(fetch.to_string(), "product_fetch_failed");
        assert_eq!(StylizeError::NoSprite.to_string(), "no_sprite_image");
    }
}
