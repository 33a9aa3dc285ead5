//! Stylesheet and JSON rule parsing.
//!
//! [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//!
//! The stylesheet parser understands the subset of CSS syntax the cascade can
//! use: comments, `selector, selector { property: value; }` blocks and
//! `!important` (which is dropped). At-rules are skipped with a warning.
//! Unknown properties are skipped with a warning. Unbalanced braces and
//! declarations without a colon are fatal.

use std::str::FromStr;

use strum_macros::EnumString;
use wombat_common::warning::warn_once;
use wombat_common::{Error, Result};

use crate::rule::Rule;
use crate::style::{Edges, Style};

/// Properties the style record stores, by their CSS names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
enum Property {
    Color,
    FontSize,
    LineHeight,
    FontFamily,
    Background,
    BackgroundColor,
    BackgroundImage,
    Width,
    Height,
    Display,
    Position,
    Left,
    Top,
    Right,
    Bottom,
    Margin,
    MarginLeft,
    MarginTop,
    MarginRight,
    MarginBottom,
    Padding,
    PaddingLeft,
    PaddingTop,
    PaddingRight,
    PaddingBottom,
    Border,
    BorderLeft,
    BorderTop,
    BorderRight,
    BorderBottom,
    BorderWidth,
    BorderColor,
    BorderStyle,
    BorderRadius,
}

/// [§ 3 Line Styles](https://www.w3.org/TR/css-backgrounds-3/#border-style)
const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// Parse stylesheet text into rules, one rule per selector in source order.
///
/// # Errors
///
/// Returns [`Error::MalformedRule`] for an unterminated block or a stray `}`.
pub fn parse_rules(css: &str) -> Result<Vec<Rule>> {
    let source = strip_comments(css);
    let mut rules = Vec::new();
    let mut rest = source.as_str();
    let mut line = 1;

    loop {
        let Some(open) = rest.find(['{', '}']) else {
            if !rest.trim().is_empty() {
                return Err(malformed(line + count_lines(rest), "expected '{' after selector"));
            }
            break;
        };
        let prelude = &rest[..open];
        let prelude_line = line + count_lines(prelude);
        if rest[open..].starts_with('}') {
            return Err(malformed(prelude_line, "unexpected '}'"));
        }

        let body_start = open + 1;
        let Some(body_len) = block_length(&rest[body_start..]) else {
            return Err(malformed(prelude_line, "unterminated block"));
        };
        let body = &rest[body_start..body_start + body_len];
        let selectors = prelude.trim();

        if selectors.starts_with('@') {
            warn_once("css", &format!("at-rule '{selectors}' is not supported"));
        } else {
            let style = declarations_at(body, prelude_line)?;
            rules.extend(
                selectors
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|selector| Rule::new(selector, style.clone())),
            );
        }

        let consumed = body_start + body_len + 1;
        line += count_lines(&rest[..consumed]);
        rest = &rest[consumed..];
    }

    Ok(rules)
}

/// Parse a JSON array of `{"selector": ..., "style": {...}}` objects.
///
/// # Errors
///
/// Returns [`Error::MalformedRule`] carrying the line serde reports.
pub fn rules_from_json(json: &str) -> Result<Vec<Rule>> {
    serde_json::from_str(json).map_err(|e| Error::MalformedRule {
        line: e.line(),
        reason: e.to_string(),
    })
}

/// [§ 5.3.10 Parse a list of declarations](https://www.w3.org/TR/css-syntax-3/#parse-list-of-declarations)
///
/// Parse the body of a block (`color: red; margin: 0 4px`) into a style.
///
/// # Errors
///
/// Returns [`Error::MalformedRule`] for a declaration without a `:`, with
/// the line counted from the start of `body`.
pub fn parse_declarations(body: &str) -> Result<Style> {
    declarations_at(body, 1)
}

/// [`parse_declarations`] for a body starting on `first_line`.
fn declarations_at(body: &str, first_line: usize) -> Result<Style> {
    let mut style = Style::default();
    let mut offset = 0;
    for raw in body.split(';') {
        let start = offset;
        offset += raw.len() + 1;
        let declaration = raw.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((name, value)) = declaration.split_once(':') else {
            let leading = raw.len() - raw.trim_start().len();
            let line = first_line + count_lines(&body[..start + leading]);
            return Err(malformed(line, &format!("expected ':' in '{declaration}'")));
        };
        let name = name.trim();
        let value = value.trim();
        let value = value.strip_suffix("!important").map_or(value, str::trim_end);
        match Property::from_str(name) {
            Ok(property) => apply(&mut style, property, value),
            Err(_) => warn_once("css", &format!("unsupported property '{name}'")),
        }
    }
    Ok(style)
}

fn apply(style: &mut Style, property: Property, value: &str) {
    let v = value.to_string();
    match property {
        Property::Color => style.color = v,
        Property::FontSize => style.font_size = v,
        Property::LineHeight => style.line_height = v,
        Property::FontFamily => style.font_family = v,
        Property::Background => {
            if value.starts_with("url(") {
                style.background_image = v;
            } else {
                style.background_color = v;
            }
        }
        Property::BackgroundColor => style.background_color = v,
        Property::BackgroundImage => style.background_image = v,
        Property::Width => style.width = v,
        Property::Height => style.height = v,
        Property::Display => style.display = v,
        Property::Position => style.position = v,
        Property::Left => style.offset.left = v,
        Property::Top => style.offset.top = v,
        Property::Right => style.offset.right = v,
        Property::Bottom => style.offset.bottom = v,
        Property::Margin => style.margin.merge_from(&expand_sides(value)),
        Property::MarginLeft => style.margin.left = v,
        Property::MarginTop => style.margin.top = v,
        Property::MarginRight => style.margin.right = v,
        Property::MarginBottom => style.margin.bottom = v,
        Property::Padding => style.padding.merge_from(&expand_sides(value)),
        Property::PaddingLeft => style.padding.left = v,
        Property::PaddingTop => style.padding.top = v,
        Property::PaddingRight => style.padding.right = v,
        Property::PaddingBottom => style.padding.bottom = v,
        Property::BorderWidth => style.border_width.merge_from(&expand_sides(value)),
        Property::BorderColor => style.border_color.merge_from(&expand_sides(value)),
        Property::BorderStyle => style.border_style.merge_from(&expand_sides(value)),
        Property::BorderRadius => style.border_radius.merge_from(&expand_sides(value)),
        Property::Border => apply_border(style, value, |edges| edges.clone()),
        Property::BorderLeft => apply_border(style, value, |e| only(|s| &mut s.left, &e.left)),
        Property::BorderTop => apply_border(style, value, |e| only(|s| &mut s.top, &e.top)),
        Property::BorderRight => apply_border(style, value, |e| only(|s| &mut s.right, &e.right)),
        Property::BorderBottom => {
            apply_border(style, value, |e| only(|s| &mut s.bottom, &e.bottom));
        }
    }
}

/// [§ 4.4 Border Shorthand Properties](https://www.w3.org/TR/css-backgrounds-3/#border-shorthands)
///
/// Split `1px solid #333` into width, style and color, then write each
/// through `select`, which picks the sides the property covers.
fn apply_border(style: &mut Style, value: &str, select: impl Fn(&Edges) -> Edges) {
    for token in value.split_ascii_whitespace() {
        let lower = token.to_ascii_lowercase();
        let target = if BORDER_STYLES.contains(&lower.as_str()) {
            &mut style.border_style
        } else if token.starts_with(|c: char| c.is_ascii_digit()) {
            &mut style.border_width
        } else {
            &mut style.border_color
        };
        target.merge_from(&select(&Edges::all(token)));
    }
}

fn only(side: impl Fn(&mut Edges) -> &mut String, value: &str) -> Edges {
    let mut edges = Edges::default();
    value.clone_into(side(&mut edges));
    edges
}

/// [§ 4.2 Margin Shorthand](https://www.w3.org/TR/css-box-3/#margin-shorthand)
///
/// "If there is only one component value, it applies to all sides. If there
/// are two values, the top and bottom margins are set to the first value and
/// the right and left margins are set to the second. If there are three
/// values, the top is set to the first value, the left and right are set to
/// the second, and the bottom is set to the third. If there are four values
/// they apply to the top, right, bottom, and left, respectively."
fn expand_sides(value: &str) -> Edges {
    let parts: Vec<&str> = value.split_ascii_whitespace().collect();
    let (top, right, bottom, left) = match parts.as_slice() {
        [] => return Edges::default(),
        [all] => (*all, *all, *all, *all),
        [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
        [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
        [top, right, bottom, left, ..] => (*top, *right, *bottom, *left),
    };
    Edges {
        left: left.to_string(),
        top: top.to_string(),
        right: right.to_string(),
        bottom: bottom.to_string(),
    }
}

/// Replace `/* ... */` comments with spaces, keeping newlines so line
/// numbers stay accurate.
fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let (comment, remainder) = after
            .find("*/")
            .map_or((after, ""), |end| (&after[..end], &after[end + 2..]));
        out.extend(comment.chars().filter(|&c| c == '\n'));
        out.push(' ');
        rest = remainder;
    }
    out.push_str(rest);
    out
}

/// Length of a block body up to (not including) its matching `}`,
/// accounting for nested blocks inside at-rules.
fn block_length(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn count_lines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}

fn malformed(line: usize, reason: &str) -> Error {
    Error::MalformedRule {
        line,
        reason: reason.to_string(),
    }
}
