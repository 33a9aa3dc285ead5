//! Box layout of the body subtree.
//!
//! [CSS Display Module Level 3](https://www.w3.org/TR/css-display-3/)
//!
//! Layout walks the markup tree once, depth first, and produces a
//! [`BoxTree`] whose every node carries Outer, Container and Inner
//! rectangles in canvas pixels. Images are fetched and resized during the
//! walk through an [`ImageSource`].

mod box_tree;
mod engine;
mod replaced;

use std::collections::HashMap;

use wombat_common::image::LoadedImage;
use wombat_common::{Error, Result};

use crate::style::{DisplayKeyword, Style};

pub use box_tree::{BoxTree, LayoutBox, NodeKind, Payload, Rect};
pub use engine::{DEFAULT_MAX_DEPTH, LayoutContext, layout, layout_document};
pub use replaced::replaced_size;

/// Where layout gets decoded images from.
///
/// The render crate implements this over HTTP, `data:` URLs and local files.
pub trait ImageSource {
    /// Fetch and decode the image an `img` element's `src` names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] or [`Error::Decode`].
    fn load(&self, src: &str) -> Result<LoadedImage>;
}

/// An [`ImageSource`] backed by a map of already decoded images.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, LoadedImage>,
}

impl MemoryImageSource {
    /// An empty source; every lookup fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `image` under `src`.
    pub fn insert(&mut self, src: &str, image: LoadedImage) {
        let _ = self.images.insert(src.to_string(), image);
    }

    /// Builder-style [`Self::insert`].
    #[must_use]
    pub fn with(mut self, src: &str, image: LoadedImage) -> Self {
        self.insert(src, image);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn load(&self, src: &str) -> Result<LoadedImage> {
        self.images.get(src).cloned().ok_or_else(|| Error::Fetch {
            url: src.to_string(),
            reason: "no such image".to_string(),
        })
    }
}

/// [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
///
/// "The following elements are expected to be hidden"
const HIDDEN_ELEMENTS: &[&str] = &[
    "head", "link", "meta", "script", "style", "template", "title",
];

/// True when an element generates no box at all.
pub(crate) fn is_hidden_element(tag_name: &str, style: &Style) -> bool {
    HIDDEN_ELEMENTS.contains(&tag_name) || style.display_keyword() == Some(DisplayKeyword::None)
}

/// True for elements that lay out as inline containers: `span` unless it
/// is made a block, and anything with `display: inline`.
pub(crate) fn is_inline_element(tag_name: &str, style: &Style) -> bool {
    match style.display_keyword() {
        Some(DisplayKeyword::Inline) => true,
        Some(DisplayKeyword::Block | DisplayKeyword::None) => false,
        None => tag_name == "span",
    }
}
