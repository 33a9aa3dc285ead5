//! Decoded image data shared by layout and raster.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::{Error, Result};

/// Largest pixel buffer the pipeline allocates, 1 GiB of RGBA.
pub const MAX_PIXELS: u64 = 1 << 28;

/// Check that a `width` x `height` buffer stays within [`MAX_PIXELS`].
///
/// # Errors
///
/// Returns [`Error::TooLarge`] when it does not.
pub fn check_size(width: u64, height: u64) -> Result<()> {
    if width.saturating_mul(height) > MAX_PIXELS {
        return Err(Error::TooLarge { width, height });
    }
    Ok(())
}

/// A decoded image resource.
///
/// Holds RGBA pixels plus the format name the bytes were decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// Decoder that produced the pixels (e.g. `"png"`, `"svg"`).
    format: String,
    pixels: RgbaImage,
}

impl LoadedImage {
    /// Wrap decoded RGBA pixels.
    #[must_use]
    pub fn new(format: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            format: format.into(),
            pixels,
        }
    }

    /// Build from raw RGBA bytes, returning `None` when the buffer length does
    /// not match `width * height * 4`.
    #[must_use]
    pub fn from_rgba(
        format: impl Into<String>,
        width: u32,
        height: u32,
        rgba_data: Vec<u8>,
    ) -> Option<Self> {
        RgbaImage::from_raw(width, height, rgba_data).map(|pixels| Self::new(format, pixels))
    }

    /// Intrinsic width of the image in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Intrinsic height of the image in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Name of the format the image was decoded from.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Decoded pixels.
    #[must_use]
    pub const fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Return a copy scaled to `width` x `height` with a Lanczos3 filter.
    ///
    /// Returns a plain clone when the size already matches.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        Self {
            format: self.format.clone(),
            pixels: imageops::resize(&self.pixels, width, height, FilterType::Lanczos3),
        }
    }
}
