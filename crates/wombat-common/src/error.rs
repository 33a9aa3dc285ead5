//! Error type shared by every stage of the pipeline.
//!
//! Every failure is fatal to the current render: layout and raster
//! propagate the first error to the caller and no partial image is produced.
//! Errors are grouped into three kinds so callers can tell "fix your
//! markup/CSS" apart from "retry the fetch" and "register the font".

use thiserror::Error;

/// Result alias used throughout the Wombat crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or inconsistent configuration (body width, font registry).
    Config,
    /// Malformed markup or style input.
    Input,
    /// Failures of the surrounding environment (network, codecs, I/O).
    Environment,
}

/// A fatal pipeline error.
#[derive(Debug, Error)]
pub enum Error {
    /// The body element resolved to no usable width.
    #[error("body width is required (set `width` on the body element)")]
    MissingBodyWidth,

    /// A text node asked for a font family that is not registered.
    #[error("font family '{family}' is not registered")]
    UnknownFont {
        /// The requested family name (empty when nothing set one).
        family: String,
    },

    /// Font bytes could not be parsed.
    #[error("font family '{family}' could not be loaded: {reason}")]
    InvalidFont {
        /// Family the bytes were registered under.
        family: String,
        /// Parser message.
        reason: String,
    },

    /// A length value had non-digit content before its unit.
    #[error("malformed length '{value}'")]
    MalformedLength {
        /// The offending value as written.
        value: String,
    },

    /// A color value was not a valid hex color.
    #[error("malformed color '{value}'")]
    MalformedColor {
        /// The offending value as written.
        value: String,
    },

    /// A stylesheet could not be split into rules.
    #[error("malformed rule at line {line}: {reason}")]
    MalformedRule {
        /// 1-based source line.
        line: usize,
        /// What was expected.
        reason: String,
    },

    /// The document has no body element to lay out.
    #[error("document has no body element")]
    MissingBody,

    /// Markup nesting exceeded the configured depth.
    #[error("markup nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// The configured limit.
        limit: usize,
    },

    /// A pixel buffer would exceed [`crate::image::MAX_PIXELS`].
    #[error("{width}x{height} pixel buffer exceeds the size limit")]
    TooLarge {
        /// Requested width in pixels.
        width: u64,
        /// Requested height in pixels.
        height: u64,
    },

    /// Fetching a resource failed.
    #[error("failed to fetch '{url}': {reason}")]
    Fetch {
        /// The resource location.
        url: String,
        /// Transport or I/O message.
        reason: String,
    },

    /// Image bytes could not be decoded.
    #[error("failed to decode image '{src}': {reason}")]
    Decode {
        /// The `src` the bytes came from.
        src: String,
        /// Decoder message.
        reason: String,
    },

    /// The pixel buffer could not be encoded.
    #[error("failed to encode image: {reason}")]
    Encode {
        /// Encoder message.
        reason: String,
    },
}

impl Error {
    /// Which of the three error kinds this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingBodyWidth | Self::UnknownFont { .. } | Self::InvalidFont { .. } => {
                ErrorKind::Config
            }
            Self::MalformedLength { .. }
            | Self::MalformedColor { .. }
            | Self::MalformedRule { .. }
            | Self::MissingBody
            | Self::NestingTooDeep { .. }
            | Self::TooLarge { .. } => ErrorKind::Input,
            Self::Fetch { .. } | Self::Decode { .. } | Self::Encode { .. } => {
                ErrorKind::Environment
            }
        }
    }
}
