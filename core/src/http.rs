//! HTTP request and response values exchanged with a [`Transport`].
//!
//! # Design
//! Requests and responses are plain data. `NodeClient` builds an
//! `HttpRequest`, hands it to a transport, and parses the `HttpResponse` it
//! gets back, so every endpoint can also be driven by a host that performs
//! the round trip itself.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL: the client's base URL followed by the route.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// `url` is the URL of the request that produced it and ends up in mapped
/// status errors. `body` holds the raw bytes; decoding them is left to the
/// client so that a body which is not UTF-8 fails as a parse error.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Whether the transport should read the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    Read,
    /// Return as soon as the status line arrives; `body` stays empty.
    Discard,
}
