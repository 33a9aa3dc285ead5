//! Image loading pipeline: fetch, detect format, and decode.
//!
//! [§ 4.8.3 The img element](https://html.spec.whatwg.org/multipage/embedded-content.html#the-img-element)
//!
//! 1. **Fetch**: [`wombat_common::net::fetch_resource`] reads HTTP(S), `data:`
//!    URLs and local files.
//! 2. **Detect**: [`detect_format()`] decides between SVG and raster from
//!    the extension, the `data:` MIME type and the leading bytes.
//! 3. **Decode**: the [`ImageDecoder`] implementations [`SvgDecoder`] and
//!    [`RasterDecoder`].
//!
//! [`ImageLoader`] ties these together and is the [`ImageSource`] layout
//! uses. Images are fetched one at a time, in document order.

use std::path::Path;

use wombat_common::image::LoadedImage;
use wombat_common::net::fetch_resource;
use wombat_common::url::resolve_src;
use wombat_common::warning::warn_once;
use wombat_common::{Error, Result};
use wombat_css::ImageSource;

/// Detected image format.
///
/// The `image` crate tells raster sub-formats apart on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// SVG vector image (decoded via usvg + resvg).
    Svg,
    /// Raster image (PNG, JPEG, GIF, WebP, ...).
    Raster,
}

/// Strip query string (`?…`) and fragment (`#…`) so the remaining path can
/// be checked for a file extension.
///
/// [URL Standard § 4.1](https://url.spec.whatwg.org/#concept-url-path)
#[must_use]
pub fn strip_url_decorations(resolved: &str) -> &str {
    if resolved.starts_with("data:") {
        return resolved;
    }
    let without_fragment = resolved.split_once('#').map_or(resolved, |(b, _)| b);
    without_fragment
        .split_once('?')
        .map_or(without_fragment, |(b, _)| b)
}

/// Detect whether `bytes` are an SVG or a raster image.
///
/// 1. **Extension**: `.svg` in `path`.
/// 2. **Data URL MIME**: a `data:image/svg` prefix.
/// 3. **Sniffing**: `<?xml` or `<svg` after leading whitespace.
/// 4. Otherwise [`ImageFormat::Raster`].
#[must_use]
pub fn detect_format(path: &str, bytes: &[u8]) -> ImageFormat {
    if Path::new(strip_url_decorations(path))
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    {
        return ImageFormat::Svg;
    }

    if path.starts_with("data:image/svg") {
        return ImageFormat::Svg;
    }

    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head = &bytes[start..bytes.len().min(start + 256)];
    if head.starts_with(b"<?xml") || head.starts_with(b"<svg") {
        return ImageFormat::Svg;
    }

    ImageFormat::Raster
}

/// A decoder that can turn raw bytes into a [`LoadedImage`].
pub trait ImageDecoder {
    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str;

    /// Whether this decoder handles the given format.
    fn supports(&self, format: ImageFormat) -> bool;

    /// Decode `bytes`.
    ///
    /// # Errors
    ///
    /// Returns the decoder's message when the bytes cannot be decoded.
    fn decode(&self, bytes: &[u8]) -> std::result::Result<LoadedImage, String>;
}

/// Decodes SVG images via usvg → resvg rasterization.
pub struct SvgDecoder;

impl ImageDecoder for SvgDecoder {
    fn name(&self) -> &'static str {
        "SVG (resvg)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Svg
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<LoadedImage, String> {
        let opts = usvg::Options::default();
        let tree =
            usvg::Tree::from_data(bytes, &opts).map_err(|e| format!("failed to parse SVG: {e}"))?;

        let size = tree.size();
        let (w, h) = (size.width().ceil() as u32, size.height().ceil() as u32);
        if w == 0 || h == 0 {
            return Err("SVG has zero-size dimensions".to_string());
        }

        let mut pixmap = tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| "failed to allocate pixmap for SVG".to_string())?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha; the compositor expects straight alpha.
        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        LoadedImage::from_rgba("svg", w, h, data)
            .ok_or_else(|| "SVG pixel buffer has the wrong size".to_string())
    }
}

/// Decodes raster images via the `image` crate.
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn name(&self) -> &'static str {
        "Raster (image crate)"
    }

    fn supports(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Raster
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<LoadedImage, String> {
        let format = image::guess_format(bytes).map_err(|e| format!("unknown format ({e})"))?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| format!("could not decode image ({e})"))?;
        let name = format.extensions_str().first().copied().unwrap_or("raster");
        Ok(LoadedImage::new(name, decoded.to_rgba8()))
    }
}

/// Detects the format and dispatches to the matching decoder.
pub struct ImageLoaderPipeline {
    decoders: Vec<Box<dyn ImageDecoder + Send + Sync>>,
}

impl ImageLoaderPipeline {
    /// A pipeline with the SVG and raster decoders.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: vec![Box::new(SvgDecoder), Box::new(RasterDecoder)],
        }
    }

    /// Decode `bytes` fetched from `location`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when no decoder supports the format or the
    /// decoder fails.
    pub fn decode(&self, bytes: &[u8], location: &str) -> Result<LoadedImage> {
        let format = detect_format(location, bytes);
        let decoder = self
            .decoders
            .iter()
            .find(|d| d.supports(format))
            .ok_or_else(|| decode_error(location, format!("no decoder for {format:?}")))?;

        let image = decoder
            .decode(bytes)
            .map_err(|reason| decode_error(location, reason))?;
        tracing::debug!(
            target: "images",
            location = %short(location),
            decoder = decoder.name(),
            width = image.width(),
            height = image.height(),
            "decoded image"
        );
        Ok(image)
    }
}

impl Default for ImageLoaderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// [`ImageSource`] that resolves `src` against the document location,
/// fetches it and decodes it.
pub struct ImageLoader {
    base: Option<String>,
    pipeline: ImageLoaderPipeline,
}

impl ImageLoader {
    /// Loader resolving relative sources against `base` (a URL or a file
    /// path of the document), or the working directory when `None`.
    #[must_use]
    pub fn new(base: Option<&str>) -> Self {
        Self {
            base: base.map(str::to_string),
            pipeline: ImageLoaderPipeline::new(),
        }
    }
}

impl ImageSource for ImageLoader {
    fn load(&self, src: &str) -> Result<LoadedImage> {
        let src = src.trim();
        if src.is_empty() {
            return Err(Error::Fetch {
                url: String::new(),
                reason: "img element has no src".to_string(),
            });
        }
        let location = resolve_src(src, self.base.as_deref());
        if !location.starts_with("data:") && location.contains('#') {
            warn_once("images", &format!("ignoring fragment in '{src}'"));
        }
        let bytes = fetch_resource(&location)?;
        self.pipeline.decode(&bytes, &location)
    }
}

fn decode_error(location: &str, reason: String) -> Error {
    Error::Decode {
        src: short(location),
        reason,
    }
}

/// `data:` URLs are cut down for messages.
fn short(location: &str) -> String {
    if location.starts_with("data:") {
        location.chars().take(48).collect()
    } else {
        location.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension_and_sniffing() {
        assert_eq!(detect_format("icons/logo.SVG?v=2", b""), ImageFormat::Svg);
        assert_eq!(detect_format("data:image/svg+xml;base64,AA==", b""), ImageFormat::Svg);
        assert_eq!(detect_format("blob", b"  \n<svg xmlns='x'/>"), ImageFormat::Svg);
        assert_eq!(detect_format("photo.png", b"\x89PNG"), ImageFormat::Raster);
    }

    #[test]
    fn test_strip_decorations() {
        assert_eq!(strip_url_decorations("a/b.png?w=10#top"), "a/b.png");
        assert_eq!(strip_url_decorations("data:a#b"), "data:a#b");
    }

    #[test]
    fn test_svg_decode() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2">
            <rect width="4" height="2" fill="#ff0000"/></svg>"##;
        let image = ImageLoaderPipeline::new().decode(svg, "red.svg").unwrap();
        assert_eq!((image.width(), image.height()), (4, 2));
        assert_eq!(image.format(), "svg");
        assert_eq!(image.pixels().get_pixel(1, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let err = ImageLoaderPipeline::new()
            .decode(b"definitely not an image", "x.png")
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_empty_src() {
        let err = ImageLoader::new(None).load("  ").unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }
}
