//! Error types for the documentation domain

use thiserror::Error;

/// Failure to retrieve a single documentation source.
///
/// Never fatal for a run: the aggregator logs it and moves on to the next source.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid documentation URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} when fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },
}
