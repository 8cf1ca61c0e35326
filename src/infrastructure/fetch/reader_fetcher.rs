//! Reader-proxy documentation fetcher

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::core::{FetchConfig, env_secret};
use crate::documentation::{DocumentationFetcher, FetchError};
use crate::generation::SecretValue;

/// Fetches documentation pages through a reader proxy that returns markdown
pub struct ReaderDocumentationFetcher {
    client: Client,
    base_url: String,
    api_key: Option<SecretValue>,
}

impl ReaderDocumentationFetcher {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.map(SecretValue::new),
        })
    }

    /// Build from the `[fetch]` section, reading the API key from its env var if set
    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.reader_base_url.clone(),
            env_secret(&config.api_key_env),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Proxy URL for a documentation page
    pub fn reader_url(&self, url: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), url)
    }
}

#[async_trait]
impl DocumentationFetcher for ReaderDocumentationFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        // Only handle HTTP(S) URLs
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut request = self
            .client
            .get(self.reader_url(url))
            .header("X-Return-Format", "markdown");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let markdown = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!(url = %url, chars = markdown.len(), "Fetched documentation");
        Ok(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(server: &MockServer, api_key: Option<&str>) -> ReaderDocumentationFetcher {
        ReaderDocumentationFetcher::new(
            server.uri(),
            api_key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_markdown() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("X-Return-Format", "markdown"))
            .respond_with(ResponseTemplate::new(200).set_body_string("# Weather API\n\n## Auth\nUse a key."))
            .expect(1)
            .mount(&mock_server)
            .await;

        let markdown = fetcher(&mock_server, None)
            .fetch("https://docs.example.com/weather")
            .await
            .unwrap();

        assert!(markdown.starts_with("# Weather API"));
    }

    #[tokio::test]
    async fn test_fetch_sends_bearer_key() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(header("Authorization", "Bearer reader-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = fetcher(&mock_server, Some("reader-key"))
            .fetch("https://docs.example.com")
            .await;
        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = fetcher(&mock_server, None)
            .fetch("https://docs.example.com/missing")
            .await;

        match result {
            Err(FetchError::Status { status, url }) => {
                assert_eq!(status, 404);
                assert_eq!(url, "https://docs.example.com/missing");
            }
            other => panic!("Expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_url() {
        let mock_server = MockServer::start().await;
        let result = fetcher(&mock_server, None)
            .fetch("file:///etc/hosts")
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_transport_error() {
        let fetcher = ReaderDocumentationFetcher::new(
            "http://127.0.0.1:9",
            None,
            Duration::from_secs(2),
        )
        .unwrap();
        let result = fetcher.fetch("https://docs.example.com").await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }

    #[test]
    fn test_reader_url() {
        let fetcher =
            ReaderDocumentationFetcher::new("https://r.jina.ai/", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(
            fetcher.reader_url("https://docs.example.com/a"),
            "https://r.jina.ai/https://docs.example.com/a"
        );
    }
}
