//! Offline photo embedding.
//!
//! A report saved locally cannot point at an uploaded file, so its photo is
//! downsized, re-encoded as JPEG, and inlined as a `data:` URL.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use thiserror::Error;

use crate::config::PhotoConfig;

/// Prefix of every embedded photo URL.
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Why a photo could not be embedded.
#[derive(Debug, Error)]
pub enum PhotoError {
    /// The bytes could not be sniffed.
    #[error("failed to read image: {0}")]
    Read(#[from] std::io::Error),

    /// The bytes are not a supported image.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Re-encoding as JPEG failed.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Downsize `bytes` to fit `max_dimension` and return it as a JPEG data URL.
///
/// The aspect ratio is kept and smaller images are never upscaled. The
/// format is sniffed from the bytes, not taken from the declared MIME type.
pub fn embed_data_url(bytes: &[u8], config: &PhotoConfig) -> Result<String, PhotoError> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
        .map_err(PhotoError::Decode)?;

    let max = config.max_dimension.max(1);
    let resized = if decoded.width() > max || decoded.height() > max {
        decoded.thumbnail(max, max)
    } else {
        decoded
    };

    let mut jpeg = Vec::new();
    let quality = config.jpeg_quality.clamp(1, 100);
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&resized.to_rgb8())
        .map_err(PhotoError::Encode)?;

    Ok(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(&jpeg)))
}
