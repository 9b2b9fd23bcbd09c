//! Image Re-encoder: raw DCT payload → smaller baseline JPEG.
//!
//! One candidate in, one `Result` out. The stage never touches the
//! document — it sees only a byte slice and the active profile, which is
//! what lets [`crate::compress`] fan re-encodes out across worker threads.
//!
//! The encoder emits baseline sequential JPEG (SOF0). Progressive scans
//! would compress slightly better but are rejected by strict PDF viewers,
//! so baseline is a hard requirement here, not a preference.

use crate::config::CompressionProfile;
use crate::error::SkipReason;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

/// Colour layout of the re-encoded payload, for dictionary refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColor {
    /// Single-channel output → `/ColorSpace /DeviceGray`.
    Gray,
    /// Three-channel output → `/ColorSpace /DeviceRGB`.
    Rgb,
}

/// A candidate replacement payload plus the metadata the rewriter needs to
/// keep the stream dictionary consistent with it.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub color: JpegColor,
}

/// Decode `raw` as JPEG, shrink it to fit the profile's dimension cap, and
/// re-encode at the profile's quality.
///
/// Fit-inside semantics: aspect ratio is preserved and the image is only
/// ever shrunk — a source already inside the cap keeps its dimensions.
///
/// Any decode or encode failure (truncated stream, exotic ICC setup,
/// unsupported colorspace) comes back as a [`SkipReason`]; the caller
/// leaves the original stream in place and moves on.
pub fn reencode(raw: &[u8], profile: &CompressionProfile) -> Result<EncodedImage, SkipReason> {
    let decoded = image::load_from_memory_with_format(raw, ImageFormat::Jpeg).map_err(|e| {
        SkipReason::Decode {
            detail: e.to_string(),
        }
    })?;

    let resized = shrink_to_fit(decoded, profile.max_dimension);
    let (width, height) = (resized.width(), resized.height());

    // The JPEG encoder wants L8 or Rgb8 buffers. Grayscale sources stay
    // single-channel (a third of the bytes per pixel); everything else —
    // including CMYK decodes — is flattened to 8-bit RGB.
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, profile.quality);
    let color = match &resized {
        DynamicImage::ImageLuma8(gray) => {
            encoder.encode_image(gray).map_err(|e| SkipReason::Encode {
                detail: e.to_string(),
            })?;
            JpegColor::Gray
        }
        other => {
            let rgb = other.to_rgb8();
            encoder.encode_image(&rgb).map_err(|e| SkipReason::Encode {
                detail: e.to_string(),
            })?;
            JpegColor::Rgb
        }
    };

    Ok(EncodedImage {
        bytes,
        width,
        height,
        color,
    })
}

/// Shrink-only fit-inside resize: no-op when both sides already fit.
fn shrink_to_fit(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if img.width() <= max_dimension && img.height() <= max_dimension {
        img
    } else {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    }
}
