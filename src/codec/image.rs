//! Image codec (bitmap ↔ compressed image bytes).
//!
//! Encoding is deterministic for a fixed input and format. JPEG round-trips
//! preserve dimensions, not bytes.

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;

use super::{Category, CodecError, CodecKind, CodecResult, open_expecting, seal};

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Compressed container format for saved images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Lossless PNG.
    Png,
    /// Lossy JPEG with a quality in `1..=100`.
    Jpeg {
        /// Compression quality, higher is better.
        quality: u8,
    },
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Png
    }
}

/// Compresses `image` with `format`, envelope included.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> CodecResult<Vec<u8>> {
    let mut payload = Vec::new();

    match format {
        ImageFormat::Png => {
            let encoder = PngEncoder::new(&mut payload);
            image
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::Encoding {
                    reason: e.to_string(),
                })?;
        }
        ImageFormat::Jpeg { quality } => {
            // JPEG has no alpha channel; encode from RGB8.
            let rgb = image.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut payload, quality);
            rgb.write_with_encoder(encoder)
                .map_err(|e| CodecError::Encoding {
                    reason: e.to_string(),
                })?;
        }
    }

    Ok(seal(CodecKind::Image, &payload))
}

/// Reconstructs a bitmap from an image entry. The container format is
/// self-describing, so no format hint is needed.
pub fn decode(bytes: &[u8]) -> CodecResult<DynamicImage> {
    let (_, payload) = open_expecting(bytes, Category::Image)?;

    image::load_from_memory(payload).map_err(|e| CodecError::Decoding {
        reason: e.to_string(),
    })
}
