//! [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
//!
//! A style rule: one selector and the style it applies.

use serde::{Deserialize, Serialize};

use crate::selector::Selector;
use crate::style::Style;

/// A selector string paired with a style record.
///
/// Deserializes from `{"selector": "div.card", "style": {"width": "100px"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRule", into = "RawRule")]
pub struct Rule {
    /// Selector text as written.
    pub selector: String,
    /// Declared style.
    pub style: Style,
    compiled: Selector,
}

impl Rule {
    /// Create a rule, compiling its selector.
    #[must_use]
    pub fn new(selector: &str, style: Style) -> Self {
        Self {
            selector: selector.trim().to_string(),
            style,
            compiled: Selector::parse(selector),
        }
    }

    /// The compiled selector.
    #[must_use]
    pub const fn compiled(&self) -> &Selector {
        &self.compiled
    }

    /// Cascade ordering key: the selector's character length.
    #[must_use]
    pub fn precedence(&self) -> usize {
        self.selector.chars().count()
    }
}

#[derive(Serialize, Deserialize)]
struct RawRule {
    selector: String,
    #[serde(default)]
    style: Style,
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        Self::new(&raw.selector, raw.style)
    }
}

impl From<Rule> for RawRule {
    fn from(rule: Rule) -> Self {
        Self {
            selector: rule.selector,
            style: rule.style,
        }
    }
}
