//! Resolution of `src` attributes against the document location.
//!
//! [URL Standard](https://url.spec.whatwg.org/)
//!
//! The document may come from a URL or from a local file, so the base is
//! either an `http(s)://` URL or a filesystem path.

use std::path::Path;

/// Resolve a potentially relative `src` against the document location.
///
/// - Absolute URLs (`http:`, `https:`, `data:`, `file:`) are returned as-is.
/// - With a URL base: protocol-relative, origin-relative and directory-relative
///   references are joined onto the base.
/// - With a filesystem base: relative paths are joined onto the base file's
///   directory; absolute paths are returned as-is.
/// - Without a base the reference is returned unchanged.
///
/// NOTE: `.` and `..` segments are not normalized.
#[must_use]
pub fn resolve_src(src: &str, base: Option<&str>) -> String {
    if src.starts_with("http://")
        || src.starts_with("https://")
        || src.starts_with("data:")
        || src.starts_with("file:")
    {
        return src.to_string();
    }

    let Some(base) = base else {
        return src.to_string();
    };

    if base.starts_with("http://") || base.starts_with("https://") {
        return resolve_against_url(src, base);
    }

    if Path::new(src).is_absolute() {
        return src.to_string();
    }
    Path::new(base).parent().map_or_else(
        || src.to_string(),
        |dir| dir.join(src).to_string_lossy().into_owned(),
    )
}

fn resolve_against_url(src: &str, base: &str) -> String {
    if src.starts_with("//") {
        // Protocol-relative: keep the base's scheme
        let scheme = base.split_once(':').map_or("http", |(scheme, _)| scheme);
        return format!("{scheme}:{src}");
    }

    if src.starts_with('/') {
        // Origin-relative: everything up to the first slash after "://"
        return base.find("://").map_or_else(
            || src.to_string(),
            |scheme_end| {
                let after_scheme = &base[scheme_end + 3..];
                after_scheme.find('/').map_or_else(
                    || format!("{base}{src}"),
                    |path_start| format!("{}{src}", &base[..scheme_end + 3 + path_start]),
                )
            },
        );
    }

    let base_dir = base.rsplit_once('/').map_or(base, |(dir, _)| dir);
    format!("{base_dir}/{src}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_sources_pass_through() {
        assert_eq!(
            resolve_src("https://cdn.example.com/a.png", Some("/tmp/card.html")),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(resolve_src("data:image/png;base64,AA==", None), "data:image/png;base64,AA==");
    }

    #[test]
    fn test_relative_to_url() {
        let base = Some("https://example.com/cards/index.html");
        assert_eq!(resolve_src("logo.png", base), "https://example.com/cards/logo.png");
        assert_eq!(resolve_src("/img/logo.png", base), "https://example.com/img/logo.png");
        assert_eq!(resolve_src("//cdn.example.com/x.png", base), "https://cdn.example.com/x.png");
    }

    #[test]
    fn test_relative_to_file() {
        assert_eq!(
            resolve_src("logo.png", Some("/srv/cards/card.html")),
            "/srv/cards/logo.png"
        );
        assert_eq!(resolve_src("/abs/logo.png", Some("/srv/cards/card.html")), "/abs/logo.png");
        assert_eq!(resolve_src("logo.png", None), "logo.png");
    }
}
