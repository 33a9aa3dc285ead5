//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/)
//!
//! Only simple and compound selectors are supported: `*`, `tag`, `.class`,
//! `tag.class` and chained classes like `.a.b`. Selectors containing
//! combinators, IDs, attributes or pseudo-classes parse as unsupported and
//! never match.

use wombat_common::warning::warn_once;
use wombat_dom::ElementData;

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// `None` for the universal selector or a class-only selector.
    tag: Option<String>,
    /// [§ 6.6 Class selectors](https://www.w3.org/TR/selectors-4/#class-html)
    classes: Vec<String>,
    supported: bool,
}

impl Selector {
    /// Parse selector text. Unsupported syntax yields a selector that
    /// matches nothing and is reported once.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        Self::parse_compound(text).unwrap_or_else(|| {
            warn_once("selector", &format!("unsupported selector '{text}' never matches"));
            Self {
                tag: None,
                classes: Vec::new(),
                supported: false,
            }
        })
    }

    fn parse_compound(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        let mut parts = text.split('.');
        let head = parts.next()?;
        let tag = match head {
            "" | "*" => None,
            name if is_ident(name) => Some(name.to_ascii_lowercase()),
            _ => return None,
        };
        let classes = parts
            .map(|class| is_ident(class).then(|| class.to_string()))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            tag,
            classes,
            supported: true,
        })
    }

    /// False when the text used syntax this engine does not match.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.supported
    }

    /// [§ 3.6 Selector Matching](https://www.w3.org/TR/selectors-4/#match-against-element)
    ///
    /// Tag names compare ASCII case-insensitively, classes case-sensitively.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        if !self.supported {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.classes
            .iter()
            .all(|wanted| element.classes().any(|class| class == wanted))
    }
}

fn is_ident(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
}
