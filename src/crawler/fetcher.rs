//! HTTP transport for page content
//!
//! This module defines the transport seam used by pages to download their
//! content, and the reqwest-backed implementation used in production:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests that give up as soon as the crawl is cancelled
//! - Error classification into status and network failures

use crate::config::{HttpConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Failure reported by a transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("Http Error: {code} {reason}")]
    Status { code: u16, reason: String },

    /// The request never produced a response (DNS, connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be read as text
    #[error("Failed to read body: {0}")]
    Body(String),

    /// The crawl was cancelled while the request was in flight
    #[error("Request cancelled")]
    Cancelled,
}

/// Fetches page content for a URI
///
/// Implementations must return promptly once `cancel` fires.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, uri: &Url, cancel: &CancellationToken) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `http` - Timeouts applied to every request
///
/// # Example
///
/// ```no_run
/// use sumi_seek::config::{HttpConfig, UserAgentConfig};
/// use sumi_seek::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(http.request_timeout))
        .connect_timeout(Duration::from_secs(http.connect_timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a transport from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        http: &HttpConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, http)?))
    }

    async fn get(&self, uri: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(uri.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, uri: &Url, cancel: &CancellationToken) -> Result<String, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.get(uri) => result,
        }
    }
}

/// Maps a reqwest error onto a transport failure
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Network("Request timeout".to_string())
    } else if e.is_connect() {
        FetchError::Network("Connection refused".to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_status_error_message() {
        let error = FetchError::Status {
            code: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(error.to_string(), "Http Error: 404 Not Found");
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let transport =
            HttpTransport::from_config(&UserAgentConfig::default(), &HttpConfig::default())
                .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        // The unroutable address would hang on connect if cancellation were ignored
        let uri = Url::parse("http://10.255.255.1/").unwrap();
        let result = transport.fetch(&uri, &cancel).await;
        assert_eq!(result, Err(FetchError::Cancelled));
    }
}
