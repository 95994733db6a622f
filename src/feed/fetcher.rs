use crate::feed::parser::{parse_feed, FeedEntry};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Coarse classification of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Feed could not be retrieved: unreachable, timed out, bad status, bad body.
    Network,
    /// Feed was retrieved but is not a valid RSS/Atom/JSON feed.
    Parse,
}

/// Errors that can occur while fetching a feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Connection closed before Content-Length bytes arrived
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// The fetch task ended without producing a result (e.g. it panicked)
    #[error("Fetch aborted: {0}")]
    Aborted(String),
    /// Feed content could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Parse(_) => ErrorKind::Parse,
            FetchError::Network(_)
            | FetchError::HttpStatus(_)
            | FetchError::Timeout(_)
            | FetchError::ResponseTooLarge(_)
            | FetchError::IncompleteResponse { .. }
            | FetchError::Aborted(_) => ErrorKind::Network,
        }
    }
}

/// Retrieves and parses the entries of one feed.
///
/// Implementations must resolve (successfully or not) in bounded time: a
/// timeout is reported as a [`ErrorKind::Network`] failure. No retries are
/// performed here.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError>;
}

/// [`FeedFetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_size: usize,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            max_size: DEFAULT_MAX_FEED_SIZE,
        }
    }

    /// Builds a client with the redirect policy used for feed requests.
    pub fn build_client() -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .redirect(redirect_policy())
            .user_agent(concat!("feedpane/", env!("CARGO_PKG_VERSION")))
            .build()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
        // The timeout covers the body as well as the headers
        let bytes = tokio::time::timeout(self.timeout, async {
            let response = self.client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(FetchError::HttpStatus(response.status().as_u16()));
            }
            read_limited_bytes(response, self.max_size).await
        })
        .await
        .map_err(|_| FetchError::Timeout(self.timeout))??;

        let entries = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
        tracing::debug!(url, entries = entries.len(), bytes = bytes.len(), "Fetched feed");
        Ok(entries)
    }
}

/// Redirects are limited to 3 hops and loops are rejected.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(to = %url, hop = attempt.previous().len() + 1, "Following redirect");
        attempt.follow()
    })
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>One</title><link>https://example.com/1</link></item>
    <item><title>Two</title><link>https://example.com/2</link></item>
</channel></rss>"#;

    async fn serve(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(HttpFetcher::build_client().unwrap())
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = serve(
            ResponseTemplate::new(200)
                .set_body_string(VALID_RSS)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .await;

        let entries = fetcher()
            .fetch(&format!("{}/feed", server.uri()))
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].title, "Two");
    }

    #[tokio::test]
    async fn test_fetch_404_is_network_kind() {
        let server = serve(ResponseTemplate::new(404)).await;

        let err = fetcher()
            .fetch(&format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(404)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_fetch_500_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_malformed_feed_is_parse_kind() {
        let server = serve(ResponseTemplate::new(200).set_body_string("<not valid xml")).await;

        let err = fetcher()
            .fetch(&format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_empty_feed_success() {
        let server = serve(
            ResponseTemplate::new(200)
                .set_body_string(r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#),
        )
        .await;

        let entries = fetcher()
            .fetch(&format!("{}/feed", server.uri()))
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = serve(
            ResponseTemplate::new(200)
                .set_body_string(VALID_RSS)
                .set_delay(Duration::from_secs(5)),
        )
        .await;

        let err = fetcher()
            .with_timeout(Duration::from_millis(100))
            .fetch(&format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let server = serve(ResponseTemplate::new(200).set_body_string(VALID_RSS)).await;

        let err = fetcher()
            .with_max_size(16)
            .fetch(&format!("{}/feed", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ResponseTooLarge(16)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_kind() {
        // Port 9 (discard) on localhost is not expected to be listening
        let err = fetcher()
            .with_timeout(Duration::from_secs(5))
            .fetch("http://127.0.0.1:9/feed")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }
}
