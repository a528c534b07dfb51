//! Decoding cover payloads and scaling them to thumbnail size.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, ImageResult, Limits, Rgb, RgbImage};
use thiserror::Error;
use tracing::debug;

use super::MAX_THUMBNAIL_WIDTH;

/// Height of the "unknown cover" placeholder. Its width is
/// [`MAX_THUMBNAIL_WIDTH`].
pub const UNKNOWN_COVER_HEIGHT: u32 = 120;

/// Upper bound on memory the decoder may allocate for a single cover.
///
/// Anything larger is treated as undecodable and shown as the placeholder.
pub const DECODE_ALLOC_LIMIT: u64 = 64 * 1024 * 1024;

const UNKNOWN_COVER_GREY: Rgb<u8> = Rgb([0x9e, 0x9e, 0x9e]);

/// Thumbnail geometry was asked for an image with zero width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot scale a zero-width image (height {height}) to thumbnail size")]
pub struct InvalidInput {
    pub height: u32,
}

/// Result of turning a payload into something displayable.
#[derive(Debug, Clone)]
pub enum RenderedIcon {
    /// The payload decoded, possibly scaled down.
    Decoded(DynamicImage),
    /// No payload, or it could not be decoded. Show the unknown cover.
    Fallback,
}

impl RenderedIcon {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    /// Pixel size of what will be shown, placeholder included.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Decoded(image) => (image.width(), image.height()),
            Self::Fallback => (MAX_THUMBNAIL_WIDTH, UNKNOWN_COVER_HEIGHT),
        }
    }

    /// The bitmap to hand to a sink that draws pixels.
    ///
    /// The terminal browser only reports [`dimensions`](Self::dimensions);
    /// this is for callers that actually paint the cover.
    pub fn into_image(self) -> DynamicImage {
        match self {
            Self::Decoded(image) => image,
            Self::Fallback => unknown_cover(),
        }
    }
}

/// The placeholder shown when a cover is missing or broken.
///
/// Built on demand for pixel sinks; its size is also what
/// [`RenderedIcon::dimensions`] reports for a fallback.
pub fn unknown_cover() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        MAX_THUMBNAIL_WIDTH,
        UNKNOWN_COVER_HEIGHT,
        UNKNOWN_COVER_GREY,
    ))
}

/// Height of an image scaled to [`MAX_THUMBNAIL_WIDTH`], keeping its aspect
/// ratio. Rounded to the nearest pixel.
pub fn compute_thumbnail_height(
    original_height: u32,
    original_width: u32,
) -> Result<u32, InvalidInput> {
    if original_width == 0 {
        return Err(InvalidInput {
            height: original_height,
        });
    }

    let height = f64::from(MAX_THUMBNAIL_WIDTH) * f64::from(original_height)
        / f64::from(original_width);
    Ok(height.round() as u32)
}

/// Size `render_icon(.., true)` gives an image of `width` x `height`.
///
/// Images no wider than [`MAX_THUMBNAIL_WIDTH`] keep their size; wider ones
/// are scaled to that width and keep at least one row.
pub fn thumbnail_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_THUMBNAIL_WIDTH {
        return (width, height);
    }
    let scaled = compute_thumbnail_height(height, width).map_or(1, |h| h.max(1));
    (MAX_THUMBNAIL_WIDTH, scaled)
}

/// Decode `payload` for display, scaling wide images down to thumbnail width
/// when `scale_to_thumbnail` is set.
///
/// Never fails: a missing payload, a corrupt one, or one too large to decode
/// within [`DECODE_ALLOC_LIMIT`] all produce [`RenderedIcon::Fallback`].
pub fn render_icon(payload: Option<&[u8]>, scale_to_thumbnail: bool) -> RenderedIcon {
    let Some(data) = payload else {
        return RenderedIcon::Fallback;
    };

    let decoded = match decode(data) {
        Ok(image) => image,
        Err(e) => {
            debug!(size = data.len(), error = %e, "Cover did not decode, using placeholder");
            return RenderedIcon::Fallback;
        }
    };

    let (width, height) = thumbnail_dimensions(decoded.width(), decoded.height());
    if !scale_to_thumbnail || width == decoded.width() {
        return RenderedIcon::Decoded(decoded);
    }

    let scaled = decoded.resize_exact(width, height, FilterType::Triangle);
    // Release the full-size buffer now rather than at the end of the caller's scope.
    drop(decoded);

    RenderedIcon::Decoded(scaled)
}

fn decode(data: &[u8]) -> ImageResult<DynamicImage> {
    let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;

    let mut limits = Limits::default();
    limits.max_alloc = Some(DECODE_ALLOC_LIMIT);
    reader.limits(limits);

    reader.decode()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
