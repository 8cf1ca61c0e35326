//! Documentation aggregation - fetches every source and merges the results

use crate::documentation::{AggregatedDocumentation, DocumentationFetcher};
use futures::{StreamExt, stream};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches documentation sources and merges them into one context
pub struct DocumentationAggregator {
    fetcher: Arc<dyn DocumentationFetcher>,
    concurrency: usize,
}

impl DocumentationAggregator {
    /// Create an aggregator that fetches one source at a time
    pub fn new(fetcher: Arc<dyn DocumentationFetcher>) -> Self {
        Self {
            fetcher,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` fetches in flight. Merge order stays the input order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch and merge every source.
    ///
    /// A failing source is logged and skipped. With no successful fetch at all the
    /// result is empty documentation, which downstream stages accept.
    pub async fn aggregate(&self, urls: &[String]) -> AggregatedDocumentation {
        let fetched: Vec<_> = stream::iter(urls.iter().cloned())
            .map(|url| {
                let fetcher = Arc::clone(&self.fetcher);
                async move {
                    let result = fetcher.fetch(&url).await;
                    (url, result)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut documentation = AggregatedDocumentation::default();
        for (url, result) in fetched {
            match result {
                Ok(markdown) => {
                    debug!(url = %url, chars = markdown.len(), "Fetched documentation source");
                    documentation.push_source(&url, &markdown);
                }
                Err(e) => warn!(url = %url, error = %e, "Skipping documentation source"),
            }
        }

        info!(
            requested = urls.len(),
            fetched = documentation.sources().len(),
            sections = documentation.sections().len(),
            "Aggregated documentation"
        );
        documentation
    }
}
