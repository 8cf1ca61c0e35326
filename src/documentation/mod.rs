//! Documentation domain - collects API documentation from several sources
//!
//! Each source URL is handed to a [`DocumentationFetcher`] that returns normalised
//! markdown. Successful fetches are concatenated in input order and indexed by
//! `(source, section title)`; failing sources are skipped.

pub mod aggregator;
pub mod errors;
pub mod sections;
pub mod traits;
pub mod types;

pub use aggregator::*;
pub use errors::*;
pub use sections::*;
pub use traits::*;
pub use types::*;
