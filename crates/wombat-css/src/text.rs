//! Text measurement by estimate.
//!
//! Layout never consults font outlines. A character below U+0080 counts as
//! 1.7 units and anything else as 3 units, where 3 units equal one em. The
//! layout splitter, the text box edges and the raster pen all use the same
//! estimate, so boxes and drawn text stay in step.

/// [§ 3.5 Font size: the font-size property](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// "medium" in most user agents.
pub const DEFAULT_FONT_SIZE_PX: i32 = 16;

/// Width of a character below U+0080, in tenths of a unit.
pub const NARROW_TENTHS: i64 = 17;

/// Width of any other character, in tenths of a unit.
pub const WIDE_TENTHS: i64 = 30;

/// Tenths of a unit per em (3 units).
pub const TENTHS_PER_EM: i64 = 30;

/// Characters trimmed from text runs and collapsed inside them.
///
/// [§ 2.1.1 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
pub const CUT_SET: &[char] = &[' ', '\t', '\r', '\n', '\x0c'];

/// Estimated width of one character in tenths of a unit.
#[must_use]
pub fn char_tenths(ch: char) -> i64 {
    if u32::from(ch) < 128 {
        NARROW_TENTHS
    } else {
        WIDE_TENTHS
    }
}

/// Estimated width of a string in tenths of a unit.
#[must_use]
pub fn text_tenths(text: &str) -> i64 {
    text.chars().map(char_tenths).sum()
}

/// Estimated width in pixels: `units * font_size / 3`, rounded down.
#[must_use]
pub fn text_width(text: &str, font_size: i32) -> i32 {
    let scaled = text_tenths(text) * i64::from(font_size) / TENTHS_PER_EM;
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

/// Vertical stride of one line: the line height, or the font size when larger.
#[must_use]
pub fn line_advance(font_size: i32, line_height: i32) -> i32 {
    font_size.max(line_height)
}

/// [§ 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
///
/// Trim [`CUT_SET`] from both ends and collapse inner whitespace runs to a
/// single space. Returns `None` when nothing is left.
#[must_use]
pub fn normalize_whitespace(text: &str) -> Option<String> {
    let trimmed = text.trim_matches(CUT_SET);
    if trimmed.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(trimmed.len());
    let mut in_space = false;
    for ch in trimmed.chars() {
        if CUT_SET.contains(&ch) {
            in_space = true;
        } else {
            if in_space {
                out.push(' ');
                in_space = false;
            }
            out.push(ch);
        }
    }
    Some(out)
}

/// Greedy line breaker over a normalized text run.
///
/// The first line starts at `start_x`; continuation lines start at `left`.
/// A character is placed while its right edge stays within the inclusive
/// right boundary `right`; every line takes at least one character. Leading
/// spaces of continuation lines are dropped.
///
/// The splitter is `Clone`, so a caller can measure a run and then walk it
/// again from the beginning.
#[derive(Debug, Clone)]
pub struct LineSplitter<'a> {
    text: &'a str,
    font_size: i32,
    start_x: i32,
    left: i32,
    right: i32,
    pos: usize,
    first: bool,
}

impl<'a> LineSplitter<'a> {
    /// Split `text` at `font_size` between `left` and `right`, starting the
    /// first line at `start_x`.
    #[must_use]
    pub const fn new(text: &'a str, font_size: i32, start_x: i32, left: i32, right: i32) -> Self {
        Self {
            text,
            font_size,
            start_x,
            left,
            right,
            pos: 0,
            first: true,
        }
    }

    /// X coordinate where the next line starts.
    #[must_use]
    pub const fn next_line_x(&self) -> i32 {
        if self.first { self.start_x } else { self.left }
    }
}

impl<'a> Iterator for LineSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.first {
            let rest = &self.text[self.pos..];
            self.pos += rest.len() - rest.trim_start_matches(' ').len();
        }
        if self.pos >= self.text.len() {
            return None;
        }

        // Positions are kept in pixels * TENTHS_PER_EM so the sums stay exact.
        let limit = (i64::from(self.right) + 1) * TENTHS_PER_EM;
        let font_size = i64::from(self.font_size);
        let mut x = i64::from(self.next_line_x()) * TENTHS_PER_EM;
        let rest = &self.text[self.pos..];
        let mut end = rest.len();
        for (i, ch) in rest.char_indices() {
            let width = char_tenths(ch) * font_size;
            if i > 0 && x + width > limit {
                end = i;
                break;
            }
            x += width;
        }

        let line = &rest[..end];
        self.pos += end;
        self.first = false;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_widths() {
        assert_eq!(char_tenths('a'), 17);
        assert_eq!(char_tenths('字'), 30);
        assert_eq!(text_tenths("ab字"), 64);
    }

    #[test]
    fn test_text_width() {
        // 10 narrow chars = 17 units, at 30px: 17 * 10 = 170
        assert_eq!(text_width("abcdefghij", 30), 170);
        // one wide char is exactly one em
        assert_eq!(text_width("字", 16), 16);
        assert_eq!(text_width("", 16), 0);
    }

    #[test]
    fn test_line_advance() {
        assert_eq!(line_advance(16, 0), 16);
        assert_eq!(line_advance(16, 24), 24);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_whitespace("  a \n\t b  ").as_deref(), Some("a b"));
        assert_eq!(normalize_whitespace(" \n "), None);
    }

    #[test]
    fn test_splitter_wraps_and_restarts() {
        // "字" is 12px at font size 12: three fit in [0, 35], four do not.
        let splitter = LineSplitter::new("字字字字字字字", 12, 0, 0, 35);
        let lines: Vec<&str> = splitter.clone().collect();
        assert_eq!(lines, vec!["字字字", "字字字", "字"]);
        assert_eq!(splitter.collect::<Vec<_>>(), lines);
    }

    #[test]
    fn test_splitter_first_line_offset() {
        // The first line starts 24px in, leaving room for one character.
        let lines: Vec<&str> = LineSplitter::new("字字字字", 12, 24, 0, 35).collect();
        assert_eq!(lines, vec!["字", "字字字"]);
    }

    #[test]
    fn test_splitter_drops_leading_space_on_wrap() {
        // narrow chars are 6.8px at 12px: "ab" fits in [0, 15], "ab " does not
        let lines: Vec<&str> = LineSplitter::new("ab cd", 12, 0, 0, 15).collect();
        assert_eq!(lines, vec!["ab", "cd"]);
    }

    #[test]
    fn test_splitter_takes_one_char_when_nothing_fits() {
        let lines: Vec<&str> = LineSplitter::new("字字", 12, 100, 0, 5).collect();
        assert_eq!(lines, vec!["字", "字"]);
    }
}
