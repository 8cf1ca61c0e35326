//! Core building blocks shared by every layer: configuration and the top-level error.

pub mod config;
pub mod error;

pub use config::*;
pub use error::{Error, Result};
