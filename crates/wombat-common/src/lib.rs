//! Common utilities for the Wombat renderer.
//!
//! This crate provides shared infrastructure used by all pipeline stages:
//! - **Errors** - the fatal [`Error`] type and its [`ErrorKind`] classification
//! - **Images** - decoded image data with resizing
//! - **Fetching** - HTTP, `data:` URL and local file reads
//! - **URLs** - resolving `src` attributes against the document location
//! - **Warning System** - deduplicated diagnostics for skipped input

pub mod error;
pub mod image;
pub mod net;
pub mod url;
pub mod warning;

pub use error::{Error, ErrorKind, Result};
