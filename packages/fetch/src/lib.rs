#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Retrying HTTP fetch primitive.
//!
//! Every network-facing resolver in the workspace goes through a
//! [`Fetcher`] instead of calling `reqwest` directly. The fetcher owns a
//! [`Transport`] (the real implementation is [`ReqwestTransport`]) and a
//! [`RetryPolicy`], and knows nothing about the registries it talks to.
//!
//! # Usage
//!
//! ```ignore
//! use dakstudio_fetch::{Fetcher, RetryPolicy, build_url};
//!
//! let fetcher = Fetcher::with_reqwest(RetryPolicy::default(), Duration::from_secs(20))?;
//! let url = build_url("https://api.example.org/search", &[("q", address.to_string())])?;
//! let body = fetcher.fetch_json(&url).await?;
//! ```

pub mod retry;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use reqwest::Url;
pub use retry::RetryPolicy;

/// Errors produced by the fetch primitive.
///
/// Resolvers catch these at their boundary and degrade to "not found";
/// only the fetcher itself surfaces them.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The underlying HTTP client failed (connect, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// A transport-level failure not originating from `reqwest`.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A request URL could not be assembled.
    #[error("Invalid URL {input}: {message}")]
    InvalidUrl {
        /// The base URL that failed to parse.
        input: String,
        /// Parser message.
        message: String,
    },

    /// No attempt produced an observable error (zero-attempt policy).
    #[error("fetch failed: {url}")]
    Exhausted {
        /// Requested URL.
        url: String,
    },
}

/// Raw response handed back by a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Returns `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// A single-shot HTTP GET. Retries are layered on top by [`Fetcher`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one GET request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request could not be completed.
    /// Non-success statuses are reported through
    /// [`TransportResponse::status`], not as errors.
    async fn get(&self, url: &Url) -> Result<TransportResponse, FetchError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the TLS backend fails to initialise.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dakstudio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// Resilient request primitive: a transport plus a retry policy.
///
/// Cheap to clone; every clone shares the same transport.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher over an arbitrary transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Creates a fetcher over a fresh [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the HTTP client cannot be built.
    pub fn with_reqwest(policy: RetryPolicy, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(timeout)?), policy))
    }

    /// Returns a fetcher sharing this transport but using another policy.
    #[must_use]
    pub fn with_policy(&self, policy: RetryPolicy) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            policy,
        }
    }

    /// The retry policy in effect.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetches `url` and returns the body text of the first successful
    /// response.
    ///
    /// # Errors
    ///
    /// Returns the last observed [`FetchError`] once every attempt has
    /// failed, or [`FetchError::Exhausted`] if no attempt was made.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        retry::send_with_retry(self.transport.as_ref(), url, self.policy).await
    }

    /// Like [`Self::fetch`], then parses the body as JSON.
    ///
    /// A body that is not JSON is not retried.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if fetching fails or the body is not JSON.
    pub async fn fetch_json(&self, url: &Url) -> Result<serde_json::Value, FetchError> {
        let body = self.fetch(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Parses `base` and appends percent-encoded query parameters.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base` is not an absolute URL.
pub fn build_url(base: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
    Url::parse_with_params(base, params).map_err(|e| FetchError::InvalidUrl {
        input: base.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    #[test]
    fn build_url_encodes_query_values() {
        let url = build_url(
            "https://example.org/wfs",
            &[("cql_filter", "INTERSECTS(geom,POINT(4.3 52.1))".to_string())],
        )
        .unwrap();
        assert!(url.as_str().starts_with("https://example.org/wfs?cql_filter="));
        assert!(!url.as_str().contains(' '));
        let (_, value) = url.query_pairs().next().unwrap();
        assert_eq!(value, "INTERSECTS(geom,POINT(4.3 52.1))");
    }

    #[test]
    fn build_url_rejects_relative_base() {
        let err = build_url("/relative/path", &[]).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn fetch_json_parses_body() {
        let transport =
            Arc::new(ScriptedTransport::new().respond("example.org", 200, r#"{"ok":true}"#));
        let fetcher = Fetcher::new(transport, RetryPolicy::immediate(3));
        let url = build_url("https://example.org/a", &[]).unwrap();
        let json = fetcher.fetch_json(&url).await.unwrap();
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn fetch_json_does_not_retry_malformed_body() {
        let transport = Arc::new(ScriptedTransport::new().respond("example.org", 200, "<html>"));
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::immediate(3));
        let url = build_url("https://example.org/a", &[]).unwrap();
        let err = fetcher.fetch_json(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn with_policy_keeps_transport() {
        let transport = Arc::new(ScriptedTransport::new());
        let fetcher = Fetcher::new(transport, RetryPolicy::default());
        let single = fetcher.with_policy(RetryPolicy::immediate(1));
        assert_eq!(single.policy().attempts, 1);
        assert_eq!(fetcher.policy().attempts, 3);
    }
}
