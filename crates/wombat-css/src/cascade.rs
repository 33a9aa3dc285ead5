//! CSS Cascading and Style Computation
//!
//! This module implements style computation per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/),
//! with selector length standing in for specificity.

use wombat_common::Result;
use wombat_dom::ElementData;

use crate::rule::Rule;
use crate::style::Style;
use crate::text::DEFAULT_FONT_SIZE_PX;
use crate::units::resolve_length;

/// [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
/// "The cascade takes an unordered list of declared values for a given property
/// on a given element, sorts them by their declaration's precedence..."
///
/// Fold every rule whose selector matches `element` into one style. Rules are
/// ordered by selector length (shorter first); the sort is stable, so among
/// equal lengths the later rule in `rules` wins. Only set fields overwrite.
#[must_use]
pub fn cascade(element: &ElementData, rules: &[Rule]) -> Style {
    let mut matched: Vec<&Rule> = rules
        .iter()
        .filter(|rule| rule.compiled().matches(element))
        .collect();

    // [§ 6.4.3 Specificity](https://www.w3.org/TR/css-cascade-4/#cascade-specificity)
    matched.sort_by_key(|rule| rule.precedence());

    matched.into_iter().fold(Style::default(), |mut style, rule| {
        style.merge_from(&rule.style);
        style
    })
}

/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
///
/// Inherit from `parent` and rewrite this element's own `font-size` and
/// `line-height` as pixels, so descendants inherit absolute values:
///
/// - a `font-size` percentage refers to the inherited font size
///   (16px when nothing sets one);
/// - a `line-height` percentage refers to the element's own font size.
///
/// # Errors
///
/// Returns [`wombat_common::Error::MalformedLength`] for malformed lengths.
pub fn compute_style(own: &Style, parent: &Style) -> Result<Style> {
    let mut computed = own.inherit_from(parent);

    if !own.font_size.is_empty() {
        let inherited = font_size_px(parent)?;
        computed.font_size = format!("{}px", resolve_length(&own.font_size, inherited)?);
    }
    if !own.line_height.is_empty() {
        let font_size = font_size_px(&computed)?;
        computed.line_height = format!("{}px", resolve_length(&own.line_height, font_size)?);
    }

    Ok(computed)
}

/// The style's font size in pixels, defaulting to [`DEFAULT_FONT_SIZE_PX`].
///
/// # Errors
///
/// Returns [`wombat_common::Error::MalformedLength`] for a malformed size.
pub fn font_size_px(style: &Style) -> Result<i32> {
    if style.font_size.trim().is_empty() {
        return Ok(DEFAULT_FONT_SIZE_PX);
    }
    resolve_length(&style.font_size, DEFAULT_FONT_SIZE_PX)
}

/// The style's line height in pixels (0 when unset).
///
/// # Errors
///
/// Returns [`wombat_common::Error::MalformedLength`] for a malformed value.
pub fn line_height_px(style: &Style) -> Result<i32> {
    resolve_length(&style.line_height, font_size_px(style)?)
}
