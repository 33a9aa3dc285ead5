//! Style rules, cascade, units, text shaping and box layout for the Wombat renderer.
//!
//! # Scope
//!
//! This crate implements:
//! - **Rules** ([CSS Syntax Level 3](https://www.w3.org/TR/css-syntax-3/))
//!   - A line-tolerant stylesheet parser for `selector { property: value; }` blocks
//!   - JSON rule lists for programmatic callers
//!   - `margin`, `padding`, `border-*` and `border` shorthands
//!
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Universal, type, class and compound `tag.class` selectors
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Rules ordered by selector length, later rules winning ties
//!   - Inheritance of `color`, `font-size`, `line-height` and `font-family`
//!
//! - **Values** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/))
//!   - `px` and `%` lengths, hex and named colors
//!
//! - **Text shaping** by a per-character width estimate
//!
//! - **Layout** of the body subtree into Outer/Container/Inner rectangles
//!
//! # Not Yet Implemented
//!
//! - Combinators, attribute selectors, pseudo-classes
//! - `em`, `rem` and `auto` lengths (they resolve to 0)
//! - Floats, flex, grid and tables

/// Cascade of matching rules and style inheritance.
pub mod cascade;
/// Hex and named colors per [CSS Color Level 4](https://www.w3.org/TR/css-color-4/).
pub mod color;
/// Box tree construction.
pub mod layout;
/// Stylesheet and JSON rule parsing.
pub mod parser;
/// Style rules.
pub mod rule;
/// Simple selector parsing and matching.
pub mod selector;
/// Per-element style records.
pub mod style;
/// Text width estimation and line splitting.
pub mod text;
/// Length resolution.
pub mod units;

pub use cascade::{cascade, compute_style};
pub use color::Color;
pub use layout::{
    BoxTree, ImageSource, LayoutBox, LayoutContext, MemoryImageSource, NodeKind, Payload, Rect,
    layout, layout_document,
};
pub use parser::{parse_rules, rules_from_json};
pub use rule::Rule;
pub use selector::Selector;
pub use style::{DisplayKeyword, Edges, PositionKeyword, Style};
pub use text::{DEFAULT_FONT_SIZE_PX, LineSplitter, line_advance, text_width};
pub use units::resolve_length;
