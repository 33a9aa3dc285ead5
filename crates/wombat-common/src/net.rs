//! Resource fetch utilities for the Wombat renderer.
//!
//! Provides the blocking HTTP GET, `data:` URL decoding and local file reads
//! used by the image loader. Every failure maps to [`Error::Fetch`].
use base64::Engine;
use std::fs;
use std::time::Duration;

use crate::error::{Error, Result};

/// User-Agent header sent with all requests.
///
/// Mimics a common desktop browser to avoid basic bot detection.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// A parsed `data:` URL that can be decoded into raw bytes.
// TODO: Support percent-encoded (non-base64) payloads.
pub struct DataURL {
    /// The full raw `data:` URL string (e.g. `data:image/png;base64,...`).
    pub raw_data: String,
}

impl DataURL {
    /// Create a new `DataURL` from a raw data URL string.
    #[must_use]
    pub const fn new(raw_data: String) -> Self {
        Self { raw_data }
    }

    /// Media type declared before the payload, e.g. `image/png`.
    #[must_use]
    pub fn media_type(&self) -> &str {
        let data_url = self.raw_data.trim_start_matches("data:");
        let metadata = data_url.split_once(',').map_or("", |(meta, _)| meta);
        metadata.split(';').next().unwrap_or("")
    }

    /// Decode the data URL payload into raw bytes.
    ///
    /// Only base64-encoded payloads are supported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] if the URL has no payload separator, is not
    /// base64-encoded, or the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let data_url = self.raw_data.trim_start_matches("data:");
        let Some((metadata, data)) = data_url.split_once(',') else {
            return Err(self.error("missing comma"));
        };

        if !metadata.ends_with(";base64") {
            return Err(self.error(&format!("unsupported data URL encoding '{metadata}'")));
        }
        base64::engine::general_purpose::STANDARD
            .decode(data.trim())
            .map_err(|e| self.error(&format!("base64 decode error: {e}")))
    }

    fn error(&self, reason: &str) -> Error {
        let shown: String = self.raw_data.chars().take(48).collect();
        Error::Fetch {
            url: shown,
            reason: reason.to_string(),
        }
    }
}

/// Fetch a URL and return its body as raw bytes.
///
/// # Errors
///
/// Returns [`Error::Fetch`] if the HTTP client cannot be created, the request
/// fails, the response has a non-success status, or the body cannot be read.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let fail = |reason: String| Error::Fetch {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| fail(format!("failed to create HTTP client: {e}")))?;

    tracing::debug!(target: "net", url, "GET");
    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| fail(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(fail(format!("HTTP error: {}", response.status())));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| fail(format!("failed to read response body: {e}")))
}

/// Fetch a resource from an HTTP(S) URL, a `data:` URL, or a local path.
///
/// # Errors
///
/// Returns [`Error::Fetch`] on any transport, decoding or I/O failure.
pub fn fetch_resource(location: &str) -> Result<Vec<u8>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        fetch_bytes(location)
    } else if location.starts_with("data:") {
        DataURL::new(location.to_string()).decode()
    } else {
        let path = location.strip_prefix("file://").unwrap_or(location);
        fs::read(path).map_err(|e| Error::Fetch {
            url: location.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_data_url_base64() {
        let url = DataURL::new("data:text/plain;base64,aGVsbG8=".to_string());
        assert_eq!(url.media_type(), "text/plain");
        assert_eq!(url.decode().unwrap(), b"hello");
    }

    #[test]
    fn test_data_url_without_comma() {
        let err = DataURL::new("data:image/png;base64".to_string())
            .decode()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Environment);
    }

    #[test]
    fn test_data_url_plain_encoding_is_rejected() {
        assert!(DataURL::new("data:,hello".to_string()).decode().is_err());
    }

    #[test]
    fn test_missing_local_file() {
        let err = fetch_resource("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }
}
