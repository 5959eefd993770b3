//! HTTP transport used by the archive client.

use async_trait::async_trait;
use filings_core::{ClientConfig, FilingsError, Result};
use reqwest::{Method, StatusCode, header};
use std::time::Duration;

/// A raw HTTP response, reduced to what the retry loop needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status.
    pub status: StatusCode,
    /// Parsed `Retry-After` header, in whole seconds.
    pub retry_after: Option<Duration>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with the given status and body.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Sets the `Retry-After` hint.
    #[must_use]
    pub const fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }
}

/// Sends one HTTP request.
///
/// Connection-level failures are reported as [`FilingsError::Network`]; any
/// response the server produced, whatever its status, is returned as `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    /// Issues `method url` and returns the response.
    async fn send(&self, method: Method, url: &str) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client that sends the configured identification on every request.
    ///
    /// # Errors
    /// Returns [`FilingsError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.identification())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FilingsError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wraps a pre-configured client.
    ///
    /// The caller is responsible for the `User-Agent` header the archive requires.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, method: Method, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json,text/html,text/plain,*/*")
            .send()
            .await
            .map_err(|e| FilingsError::Network(e.to_string()))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        let body = response
            .bytes()
            .await
            .map_err(|e| FilingsError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status,
            retry_after,
            body: body.to_vec(),
        })
    }
}

/// Parses a `Retry-After` value given in seconds.
///
/// HTTP-date values are not used by the archive and yield `None`.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after(" 120 "), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after(""), None);
    }

    #[test]
    fn test_transport_builds_from_config() {
        let config = ClientConfig::new("test@example.com").with_user_agent("Test/1.0");
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
