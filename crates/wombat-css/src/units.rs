//! [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
//!
//! Only absolute pixels and percentages are understood. Any other unit is
//! reported once and treated as zero.

use wombat_common::warning::warn_once;
use wombat_common::{Error, Result};

/// Resolve a length string to whole pixels.
///
/// - `""` resolves to 0.
/// - `"<digits>px"` resolves to the integer.
/// - `"<digits>%"` resolves to `floor(value * reference / 100)`.
/// - Anything else (`auto`, `1em`, ...) resolves to 0 with a one-time warning.
///
/// # Errors
///
/// Returns [`Error::MalformedLength`] when a `px` or `%` value has anything
/// other than ASCII digits before its unit. Signs and decimal points count
/// as malformed.
pub fn resolve_length(value: &str, reference: i32) -> Result<i32> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }

    if let Some(number) = value.strip_suffix("px") {
        return parse_digits(number, value);
    }

    if let Some(number) = value.strip_suffix('%') {
        let percent = parse_digits(number, value)?;
        let scaled = (i64::from(percent) * i64::from(reference)).div_euclid(100);
        return Ok(i32::try_from(scaled).unwrap_or(if scaled < 0 { i32::MIN } else { i32::MAX }));
    }

    warn_once("units", &format!("unsupported length '{value}' treated as 0"));
    Ok(0)
}

fn parse_digits(number: &str, original: &str) -> Result<i32> {
    let malformed = || Error::MalformedLength {
        value: original.to_string(),
    };
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    number.parse().map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_px() {
        assert_eq!(resolve_length("", 500).unwrap(), 0);
        assert_eq!(resolve_length("24px", 500).unwrap(), 24);
        assert_eq!(resolve_length(" 7px ", 0).unwrap(), 7);
    }

    #[test]
    fn test_percentages_round_down() {
        assert_eq!(resolve_length("50%", 200).unwrap(), 100);
        assert_eq!(resolve_length("33%", 100).unwrap(), 33);
        assert_eq!(resolve_length("33%", 10).unwrap(), 3);
        assert_eq!(resolve_length("100%", 0).unwrap(), 0);
    }

    #[test]
    fn test_unknown_units_are_zero() {
        assert_eq!(resolve_length("auto", 100).unwrap(), 0);
        assert_eq!(resolve_length("2em", 100).unwrap(), 0);
    }

    #[test]
    fn test_malformed_numbers() {
        for bad in ["-5px", "1.5px", "px", "abc%", "12 px", "99999999999px"] {
            let err = resolve_length(bad, 100).unwrap_err();
            assert!(
                matches!(err, Error::MalformedLength { ref value } if value == bad.trim()),
                "{bad}: {err}"
            );
        }
    }
}
