//! Port interfaces for the documentation domain

use crate::documentation::FetchError;
use async_trait::async_trait;

/// Retrieves one documentation source as normalised markdown
#[async_trait]
pub trait DocumentationFetcher: Send + Sync {
    /// Fetch the page at `url`. Retries, if any, are the implementation's business.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
