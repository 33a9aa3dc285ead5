//! Box tree types.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)

use wombat_common::image::LoadedImage;

use crate::style::Style;

/// An axis-aligned rectangle in canvas pixels.
///
/// Both corners are inclusive: a box covering the first 100 columns has
/// `x1 = 0` and `x2 = 99`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left column.
    pub x1: i32,
    /// Top row.
    pub y1: i32,
    /// Right column (inclusive).
    pub x2: i32,
    /// Bottom row (inclusive).
    pub y2: i32,
}

impl Rect {
    /// Construct from corners.
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Number of columns covered.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1).saturating_add(1)
    }

    /// Number of rows covered.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1).saturating_add(1)
    }

    /// Pixel count.
    #[must_use]
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    /// True when `other` lies entirely inside `self`.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.x1 <= other.x1 && self.y1 <= other.y1 && other.x2 <= self.x2 && other.y2 <= self.y2
    }

    /// Grow each side outward by the given amounts, saturating at the
    /// `i32` range.
    #[must_use]
    pub const fn expanded(&self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x1: self.x1.saturating_sub(left),
            y1: self.y1.saturating_sub(top),
            x2: self.x2.saturating_add(right),
            y2: self.y2.saturating_add(bottom),
        }
    }
}

/// What a box was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An element.
    Element,
    /// One line of a text run.
    Text,
    /// A comment. Layout skips comments, so no box carries this kind.
    Comment,
}

/// Content a box carries for the rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Nothing beyond background and borders.
    None,
    /// A decoded image already resized to the box.
    Image(LoadedImage),
    /// One line of text.
    Text(String),
}

/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// A laid-out node with three nested rectangles:
///
/// ```text
/// ┌────────────── outer ──────────────┐
/// │ margin                            │
/// │   ┌────────── container ──────┐   │
/// │   │ padding (background here) │   │
/// │   │   ┌────── inner ──────┐   │   │
/// │   │   │      content      │   │   │
/// │   │   └───────────────────┘   │   │
/// │   └───────────────────────────┘   │
/// └───────────────────────────────────┘
/// ```
///
/// Images have no padding box (inner equals container); text lines and
/// absolutely positioned boxes have all three rectangles equal.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBox {
    /// Source node kind.
    pub kind: NodeKind,
    /// Lowercased tag name (empty for text).
    pub tag_name: String,
    /// Raw `class` attribute (empty for text).
    pub class: String,
    /// Computed style: cascaded, inherited, font sizes in pixels.
    pub style: Style,
    /// Margin edge.
    pub outer: Rect,
    /// Padding edge; backgrounds and borders paint here.
    pub container: Rect,
    /// Content edge.
    pub inner: Rect,
    /// Text line or image.
    pub payload: Payload,
    /// Child boxes in document order.
    pub children: Vec<LayoutBox>,
}

impl LayoutBox {
    /// True for elements laid out as inline containers (`span` or
    /// `display: inline`).
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.kind == NodeKind::Element && super::is_inline_element(&self.tag_name, &self.style)
    }

    /// The text line this box draws, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Pre-order walk over this box and its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

/// The laid-out body subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxTree {
    /// The body box.
    pub root: LayoutBox,
    /// Canvas width: the body's outer width.
    pub width: u32,
    /// Canvas height: the body's explicit height, or else its outer bottom.
    pub height: u32,
}

impl BoxTree {
    /// Pre-order walk over every box.
    pub fn iter(&self) -> impl Iterator<Item = &LayoutBox> {
        self.root.iter()
    }
}
