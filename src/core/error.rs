//! Error handling for the docforge library.
//!
//! This module defines the top-level `Error` type returned by the composition-root
//! helpers (configuration loading, store bootstrap), along with a convenient `Result`
//! alias. Layer-specific errors convert into it through `#[from]`.
//!
//! # Examples
//!
//! ```
//! use docforge::core::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("templates root is not writable"))
//! }
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

/// Result type for docforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docforge operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    /// Record store error
    #[error("Record store error: {0}")]
    Store(#[from] crate::application::StoreError),

    /// Application error
    #[error("Application error: {0}")]
    Application(#[from] crate::application::ApplicationError),
}

impl Error {
    /// Create a new configuration error from a message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(crate::core::config::ConfigError::Invalid(msg.into()))
    }
}
