//! Room composition
//!
//! Deterministically overlays stylized sprites onto a base room image at
//! fixed normalized anchors and re-encodes the result as PNG. Anchor
//! placement and scale factors are exact; pixel-identical output across
//! platforms is not promised (codec rounding may differ).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{imageops, imageops::FilterType, DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;
use tracing::warn;

/// Top-left placement anchors as fractions of the base dimensions.
/// Sprite `i` lands on anchor `i`; anything past the last anchor is dropped.
///
/// Unrelated to the 7-slot UI hotspot catalog; the two sets never align.
pub const SPRITE_ANCHORS: [(f32, f32); 4] =
    [(0.15, 0.55), (0.60, 0.55), (0.20, 0.80), (0.65, 0.80)];

/// Each sprite fits inside a box of this fraction of the base dimensions.
pub const SPRITE_SCALE: f32 = 0.28;

/// Canvas size when the base image dimensions cannot be read.
const FALLBACK_WIDTH: u32 = 1024;
const FALLBACK_HEIGHT: u32 = 1024;

/// Composition errors
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid base64 image payload: {0}")]
    Base64(String),

    #[error("sprite {0} could not be decoded: {1}")]
    SpriteDecode(usize, String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Overlay up to four sprites onto the base image, returning PNG bytes.
///
/// With zero sprites the base still passes through the encode step, so the
/// output format is PNG regardless of input count.
pub fn compose(base: &[u8], sprites: &[Vec<u8>]) -> Result<Vec<u8>, ComposeError> {
    let mut canvas = match image::load_from_memory(base) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(err) => {
            warn!(error = %err, "base image dimensions unavailable, using fallback canvas");
            RgbaImage::from_pixel(FALLBACK_WIDTH, FALLBACK_HEIGHT, Rgba([255, 255, 255, 255]))
        }
    };
    let (width, height) = canvas.dimensions();
    let box_width = (width as f32 * SPRITE_SCALE).round() as u32;
    let box_height = (height as f32 * SPRITE_SCALE).round() as u32;

    // zip stops at the last anchor, dropping extra sprites silently
    for (index, (sprite, (fx, fy))) in sprites.iter().zip(SPRITE_ANCHORS.iter()).enumerate() {
        let decoded = image::load_from_memory(sprite)
            .map_err(|e| ComposeError::SpriteDecode(index, e.to_string()))?;
        let fitted = fit_inside(decoded, box_width, box_height);
        let x = (width as f32 * fx).round() as i64;
        let y = (height as f32 * fy).round() as i64;
        imageops::overlay(&mut canvas, &fitted.to_rgba8(), x, y);
    }

    encode_png(canvas)
}

/// Scale down to fit the box, preserving aspect ratio. Never upscales,
/// never crops.
fn fit_inside(sprite: DynamicImage, box_width: u32, box_height: u32) -> DynamicImage {
    let (w, h) = sprite.dimensions();
    if w > box_width || h > box_height {
        sprite.resize(box_width, box_height, FilterType::Lanczos3)
    } else {
        sprite
    }
}

fn encode_png(canvas: RgbaImage) -> Result<Vec<u8>, ComposeError> {
    let mut out = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ComposeError::Encode(e.to_string()))?;
    Ok(out)
}

/// Wrap PNG bytes in a `data:` URI.
pub fn to_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", BASE64.encode(png))
}

/// Decode an image payload that may be a bare base64 string or a
/// `data:image/png;base64,...` URI; the two forms are equivalent.
pub fn decode_image_payload(payload: &str) -> Result<Vec<u8>, ComposeError> {
    let trimmed = payload.trim();
    let b64 = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once("base64,")
            .map(|(_, body)| body)
            .ok_or_else(|| ComposeError::Base64("unsupported data URI".to_string()))?,
        None => trimmed,
    };
    BASE64
        .decode(b64.as_bytes())
        .map_err(|e| ComposeError::Base64(e.to_string()))
}
