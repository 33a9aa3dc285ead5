//! Font registry.
//!
//! [§ 5 Font Matching Algorithm](https://www.w3.org/TR/css-fonts-4/#font-matching-algorithm)
//!
//! Fonts are registered under family names before rendering and looked up
//! by the `font-family` of each text box. The registry is immutable while a
//! render runs.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use fontdue::{Font, FontSettings};
use wombat_common::{Error, Result};

/// Common system font paths to search for a default font.
const FONT_SEARCH_PATHS: &[&str] = &[
    // macOS
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    // Windows
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Family name the system font is registered under.
pub const SYSTEM_FAMILY: &str = "sans-serif";

/// Parsed fonts keyed by family name.
#[derive(Default)]
pub struct FontRegistry {
    fonts: HashMap<String, Font>,
    default_family: Option<String>,
}

impl FontRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the first system font found, registered as
    /// [`SYSTEM_FAMILY`] and made the default. Empty when none is found.
    #[must_use]
    pub fn with_system_font() -> Self {
        let mut registry = Self::new();
        for path in FONT_SEARCH_PATHS {
            if registry.register_file(SYSTEM_FAMILY, path).is_ok() {
                tracing::debug!(target: "fonts", path, "loaded system font");
                registry.default_family = Some(SYSTEM_FAMILY.to_string());
                return registry;
            }
        }
        tracing::warn!(target: "fonts", "no system font found; register one with --font");
        registry
    }

    /// Parse `bytes` and register them under `family`. The first family
    /// registered becomes the default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFont`] when the bytes are not a usable font.
    pub fn register_bytes(&mut self, family: &str, bytes: &[u8]) -> Result<()> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| {
            Error::InvalidFont {
                family: family.to_string(),
                reason: e.to_string(),
            }
        })?;
        let key = family_key(family);
        if self.default_family.is_none() {
            self.default_family = Some(key.clone());
        }
        let _ = self.fonts.insert(key, font);
        Ok(())
    }

    /// Read a font file and register it under `family`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFont`] when the file cannot be read or parsed.
    pub fn register_file(&mut self, family: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::InvalidFont {
            family: family.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        self.register_bytes(family, &bytes)
    }

    /// Use `family` for text that sets no `font-family`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFont`] when `family` is not registered.
    pub fn set_default(&mut self, family: &str) -> Result<()> {
        let key = family_key(family);
        if !self.fonts.contains_key(&key) {
            return Err(Error::UnknownFont {
                family: family.to_string(),
            });
        }
        self.default_family = Some(key);
        Ok(())
    }

    /// True when `family` is registered.
    #[must_use]
    pub fn contains(&self, family: &str) -> bool {
        self.fonts.contains_key(&family_key(family))
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// [§ 5.1 Font family](https://www.w3.org/TR/css-fonts-4/#font-family-prop)
    ///
    /// Look up a `font-family` value: the first registered name of a
    /// comma-separated list, or the default font when the value is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFont`] when no listed family is registered, or
    /// when the value is empty and there is no default.
    pub fn resolve(&self, family: &str) -> Result<&Font> {
        let mut names = family.split(',').map(family_key).filter(|n| !n.is_empty()).peekable();
        if names.peek().is_none() {
            return self
                .default_family
                .as_ref()
                .and_then(|key| self.fonts.get(key))
                .ok_or_else(|| Error::UnknownFont {
                    family: String::new(),
                });
        }
        names
            .find_map(|name| self.fonts.get(&name))
            .ok_or_else(|| Error::UnknownFont {
                family: family.trim().to_string(),
            })
    }
}

impl fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut families: Vec<&String> = self.fonts.keys().collect();
        families.sort();
        f.debug_struct("FontRegistry")
            .field("families", &families)
            .field("default_family", &self.default_family)
            .finish()
    }
}

/// Family names match case-insensitively, without surrounding quotes.
fn family_key(family: &str) -> String {
    family
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_key() {
        assert_eq!(family_key(" 'Open Sans' "), "open sans");
        assert_eq!(family_key("\"Mono\""), "mono");
    }

    #[test]
    fn test_empty_registry() {
        let registry = FontRegistry::new();
        assert!(matches!(
            registry.resolve(""),
            Err(Error::UnknownFont { ref family }) if family.is_empty()
        ));
        assert!(matches!(
            registry.resolve("Georgia, serif"),
            Err(Error::UnknownFont { ref family }) if family == "Georgia, serif"
        ));
    }

    #[test]
    fn test_invalid_bytes() {
        let mut registry = FontRegistry::new();
        let err = registry.register_bytes("junk", b"not a font").unwrap_err();
        assert!(matches!(err, Error::InvalidFont { .. }));
        assert!(registry.is_empty());
        assert!(matches!(
            registry.set_default("junk"),
            Err(Error::UnknownFont { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let mut registry = FontRegistry::new();
        let err = registry.register_file("x", "/no/such/font.ttf").unwrap_err();
        assert!(matches!(err, Error::InvalidFont { .. }));
    }
}
