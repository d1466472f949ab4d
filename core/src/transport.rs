//! The seam between `NodeClient` and the network.
//!
//! `NodeClient` holds an `Arc<dyn Transport>`, so a caller can share one
//! connection pool between clients or substitute its own implementation.
//! [`UreqTransport`] is the blocking default.

use std::time::Duration;

use crate::error::ApiError;
use crate::http::{BodyMode, HttpMethod, HttpRequest, HttpResponse};

/// Default timeout for a whole request, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Executes one HTTP round trip.
///
/// Implementations must return non-2xx responses as `Ok`; status
/// interpretation belongs to the client. Errors are limited to
/// `ApiError::InvalidRequest`, `ApiError::Transport` and `ApiError::ReadBody`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest, mode: BodyMode) -> Result<HttpResponse, ApiError>;
}

/// Settings for the default transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound for a whole request including the body read.
    pub timeout: Option<Duration>,
    /// Largest response body accepted, in bytes. `None` reads bodies in full.
    pub body_limit: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            body_limit: None,
        }
    }
}

impl TransportConfig {
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn without_timeout() -> Self {
        Self {
            timeout: None,
            ..Self::default()
        }
    }
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// The agent keeps a connection pool and is cheap to clone; concurrent calls
/// through the same transport are independent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: config.body_limit.unwrap_or(u64::MAX),
        }
    }

    /// Wrap an existing agent. It must be configured with
    /// `http_status_as_error(false)`, otherwise error envelopes are lost.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            body_limit: u64::MAX,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest, mode: BodyMode) -> Result<HttpResponse, ApiError> {
        let result = match (request.method, &request.body) {
            (HttpMethod::Get, Some(body)) => with_headers(self.agent.get(&request.url), &request.headers)
                .force_send_body()
                .send(body.as_bytes()),
            (HttpMethod::Get, None) => with_headers(self.agent.get(&request.url), &request.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&request.url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&request.url), &request.headers).send_empty()
            }
        };
        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let body = match mode {
            BodyMode::Discard => Vec::new(),
            BodyMode::Read => response
                .body_mut()
                .with_config()
                .limit(self.body_limit)
                .read_to_vec()
                .map_err(|e| ApiError::ReadBody(Box::new(e)))?,
        };

        Ok(HttpResponse {
            status,
            url: request.url.clone(),
            headers: Vec::new(),
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Separate "this request could never be sent" from network failures.
fn classify(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::BadUri(uri) => ApiError::InvalidRequest(uri),
        ureq::Error::Http(e) => ApiError::InvalidRequest(e.to_string()),
        other => ApiError::Transport(Box::new(other)),
    }
}
