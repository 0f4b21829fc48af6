//! Error types for the Postalign library.
//!
//! All fallible operations return [`Result`], whose error type is
//! [`PostalignError`]. Infrastructure failures at the search-backend boundary
//! use the dedicated [`PostalignError::Backend`] variant so that callers can
//! always tell "the backend broke" apart from "no candidate matched"; the
//! latter is an ordinary `Ok` outcome and is never represented as an error.
//!
//! # Examples
//!
//! ```
//! use postalign::error::{PostalignError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PostalignError::config("country code is required"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Postalign operations.
#[derive(Error, Debug)]
pub enum PostalignError {
    /// I/O errors (file operations, network, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors (missing country code, unknown country rules,
    /// malformed grammar data). These fail fast: every grammar and policy
    /// lookup is keyed by country, and silently defaulting would corrupt
    /// matching results.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis-related errors (tokenization, sequence building).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Search-backend infrastructure errors (timeouts, transport failures,
    /// malformed responses). Never collapsed into a "no match" result.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Internal invariant violations.
    #[error("Internal error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PostalignError.
pub type Result<T> = std::result::Result<T, PostalignError>;

impl PostalignError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PostalignError::Config(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PostalignError::Analysis(msg.into())
    }

    /// Create a new backend error.
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        PostalignError::Backend(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PostalignError::Internal(msg.into())
    }

    /// Whether this error originated at the search-backend boundary.
    pub fn is_backend(&self) -> bool {
        matches!(self, PostalignError::Backend(_))
    }
}
