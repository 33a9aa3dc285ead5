//! Per-element style records.
//!
//! A [`Style`] keeps every property as the string it was written as. Values
//! are only interpreted when layout or raster needs them, through
//! [`crate::units::resolve_length`] and [`crate::color::Color::parse`].
//! An empty string means "not set".

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Four-sided property group such as `margin` or `border-width`.
///
/// [§ 4 Margins](https://www.w3.org/TR/css-box-3/#margins)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    /// Left side.
    pub left: String,
    /// Top side.
    pub top: String,
    /// Right side.
    pub right: String,
    /// Bottom side.
    pub bottom: String,
}

impl Edges {
    /// All four sides set to the same value.
    #[must_use]
    pub fn all(value: &str) -> Self {
        Self {
            left: value.to_string(),
            top: value.to_string(),
            right: value.to_string(),
            bottom: value.to_string(),
        }
    }

    /// True when no side is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.top.is_empty() && self.right.is_empty() && self.bottom.is_empty()
    }

    /// Overwrite each side that `other` sets.
    pub fn merge_from(&mut self, other: &Self) {
        take_if_set(&mut self.left, &other.left);
        take_if_set(&mut self.top, &other.top);
        take_if_set(&mut self.right, &other.right);
        take_if_set(&mut self.bottom, &other.bottom);
    }
}

/// [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
///
/// The `display` keywords the layout engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayKeyword {
    /// Block-level box that starts on a new row.
    Block,
    /// Inline container that flows horizontally.
    Inline,
    /// "The element and its descendants generate no boxes"
    None,
}

/// [§ 2 Choosing a Positioning Scheme](https://www.w3.org/TR/css-position-3/#position-property)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PositionKeyword {
    /// Normal flow.
    #[default]
    Static,
    /// Treated as normal flow.
    Relative,
    /// Placed at its `left`/`top` offsets, outside the flow.
    Absolute,
}

/// The style record attached to a node.
///
/// Field names follow the CSS property names; with serde they are written in
/// kebab-case (`font-size`, `background-color`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Style {
    /// Text color. Inherited.
    pub color: String,
    /// Font size. Inherited.
    pub font_size: String,
    /// Line height. Inherited.
    pub line_height: String,
    /// Registered font family name. Inherited.
    pub font_family: String,
    /// Fill of the Container rectangle.
    pub background_color: String,
    /// Accepted and kept, not painted.
    pub background_image: String,
    /// Explicit Container width.
    pub width: String,
    /// Explicit content height.
    pub height: String,
    /// `block`, `inline` or `none`.
    pub display: String,
    /// `static` or `absolute`.
    pub position: String,
    /// `left`/`top`/`right`/`bottom` offsets of positioned boxes.
    pub offset: Edges,
    /// Margins.
    pub margin: Edges,
    /// Padding.
    pub padding: Edges,
    /// Accepted and kept, not painted.
    pub border_radius: Edges,
    /// Border thickness per side.
    pub border_width: Edges,
    /// Border color per side.
    pub border_color: Edges,
    /// Border style per side (`solid`, `none`, ...).
    pub border_style: Edges,
}

impl Style {
    /// [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)
    ///
    /// Overwrite every field that `other` sets. Edge groups merge side by side.
    pub fn merge_from(&mut self, other: &Self) {
        take_if_set(&mut self.color, &other.color);
        take_if_set(&mut self.font_size, &other.font_size);
        take_if_set(&mut self.line_height, &other.line_height);
        take_if_set(&mut self.font_family, &other.font_family);
        take_if_set(&mut self.background_color, &other.background_color);
        take_if_set(&mut self.background_image, &other.background_image);
        take_if_set(&mut self.width, &other.width);
        take_if_set(&mut self.height, &other.height);
        take_if_set(&mut self.display, &other.display);
        take_if_set(&mut self.position, &other.position);
        self.offset.merge_from(&other.offset);
        self.margin.merge_from(&other.margin);
        self.padding.merge_from(&other.padding);
        self.border_radius.merge_from(&other.border_radius);
        self.border_width.merge_from(&other.border_width);
        self.border_color.merge_from(&other.border_color);
        self.border_style.merge_from(&other.border_style);
    }

    /// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
    ///
    /// Copy of `self` with `color`, `font-size`, `line-height` and
    /// `font-family` taken from `parent` where `self` leaves them unset.
    #[must_use]
    pub fn inherit_from(&self, parent: &Self) -> Self {
        let mut style = self.clone();
        fill_if_unset(&mut style.color, &parent.color);
        fill_if_unset(&mut style.font_size, &parent.font_size);
        fill_if_unset(&mut style.line_height, &parent.line_height);
        fill_if_unset(&mut style.font_family, &parent.font_family);
        style
    }

    /// The `display` keyword, or `None` when unset or unrecognized.
    #[must_use]
    pub fn display_keyword(&self) -> Option<DisplayKeyword> {
        self.display.trim().parse().ok()
    }

    /// The `position` keyword; unset and unrecognized values are `static`.
    #[must_use]
    pub fn position_keyword(&self) -> PositionKeyword {
        self.position.trim().parse().unwrap_or_default()
    }

    /// True for `position: absolute`.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.position_keyword() == PositionKeyword::Absolute
    }
}

fn take_if_set(dst: &mut String, src: &str) {
    if !src.is_empty() {
        src.clone_into(dst);
    }
}

fn fill_if_unset(dst: &mut String, src: &str) {
    if dst.is_empty() {
        src.clone_into(dst);
    }
}
