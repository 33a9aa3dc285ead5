//! Rasterization and the end-to-end pipeline of the Wombat renderer.
//!
//! # Scope
//!
//! This crate provides:
//! - **Fonts** - a registry of `fontdue` fonts keyed by family name
//! - **Images** - fetching and decoding `img` sources (raster and SVG)
//! - **Compositing** - resizing and source-over blending onto the canvas
//! - **Rasterization** - painting a laid-out box tree
//! - **Output** - JPEG encoding at a chosen quality
//!
//! [`render_document`] runs the whole pipeline: parse the HTML, collect
//! `<style>` rules, lay out the body and paint it.
//!
//! # Not Yet Implemented
//!
//! - `background-image` and `border-radius` painting
//! - Dashed and dotted borders (they paint solid)
//! - Kerning and complex script shaping

pub mod compositor;
pub mod fonts;
pub mod image_loader;
pub mod raster;

pub use wombat_css as css;
pub use wombat_dom as dom;
pub use wombat_html as html;

pub use fonts::FontRegistry;
pub use image_loader::ImageLoader;
pub use raster::{DEFAULT_DPI, RenderOptions, render};

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use wombat_common::{Error, Result};
use wombat_css::{ImageSource, LayoutContext, Rule, layout_document, parse_rules};
use wombat_dom::DomTree;
use wombat_html::{extract_style_content, parse_html};

/// JPEG quality used when none is given.
pub const DEFAULT_QUALITY: u8 = 100;

/// Render an HTML document.
///
/// `rules` apply before the document's own `<style>` rules, so among
/// selectors of equal length the document wins.
///
/// # Errors
///
/// Any layout or raster error; no partial image is returned.
pub fn render_document(
    html: &str,
    rules: &[Rule],
    fonts: &FontRegistry,
    images: &dyn ImageSource,
    options: &RenderOptions,
) -> Result<RgbaImage> {
    wombat_common::warning::clear_warnings();
    let tree = parse_html(html);
    render_tree(&tree, rules, fonts, &LayoutContext::new(images), options)
}

/// Render an already parsed document.
///
/// # Errors
///
/// Any layout or raster error, including a malformed `<style>` block.
pub fn render_tree(
    tree: &DomTree,
    rules: &[Rule],
    fonts: &FontRegistry,
    ctx: &LayoutContext<'_>,
    options: &RenderOptions,
) -> Result<RgbaImage> {
    let mut all_rules = rules.to_vec();
    all_rules.extend(parse_rules(&extract_style_content(tree))?);
    tracing::debug!(target: "pipeline", rules = all_rules.len(), "collected rules");

    let boxes = layout_document(tree, &all_rules, ctx)?;
    render(&boxes, fonts, options)
}

/// Encode `buffer` as a baseline JPEG. Alpha is dropped.
///
/// # Errors
///
/// Returns [`Error::Encode`] when encoding fails.
pub fn encode_jpeg(buffer: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(buffer.clone()).to_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| Error::Encode {
            reason: e.to_string(),
        })?;
    Ok(out.into_inner())
}

/// Write `buffer` to `path`. `.jpg` and `.jpeg` paths are encoded at
/// `quality`; other extensions pick their format from the extension.
///
/// # Errors
///
/// Returns [`Error::Encode`] when encoding or writing fails.
pub fn save(buffer: &RgbaImage, path: impl AsRef<Path>, quality: u8) -> Result<()> {
    let path = path.as_ref();
    let is_jpeg = path.extension().is_some_and(|ext| {
        ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg")
    });
    let written = if is_jpeg {
        std::fs::write(path, encode_jpeg(buffer, quality)?).map_err(|e| e.to_string())
    } else {
        buffer.save(path).map_err(|e| e.to_string())
    };
    written.map_err(|reason| Error::Encode {
        reason: format!("{}: {reason}", path.display()),
    })?;
    tracing::info!(target: "pipeline", path = %path.display(), "saved image");
    Ok(())
}
