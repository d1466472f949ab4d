//! Error types for the node API client.
//!
//! # Design
//! Non-2xx responses are mapped onto a closed [`ErrorKind`] and surface as
//! [`ApiError::Status`] together with the request URL and the message the
//! node put into its error envelope. Failures that happen before a status is
//! known (request construction, connection, body read) each get their own
//! variant so callers can tell "the node said no" apart from "we never got an
//! answer".

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Kind of a non-success HTTP response, derived from its status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 404
    NotFound,
    /// 500
    InternalServerError,
    /// 501
    NotImplemented,
    /// Any other non-success status.
    Unknown,
}

impl ErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            404 => ErrorKind::NotFound,
            500 => ErrorKind::InternalServerError,
            501 => ErrorKind::NotImplemented,
            _ => ErrorKind::Unknown,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::BadRequest => "bad request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not found",
            ErrorKind::InternalServerError => "internal server error",
            ErrorKind::NotImplemented => "operation not implemented/supported/available",
            ErrorKind::Unknown => "unknown error",
        };
        f.write_str(text)
    }
}

/// Errors returned by `NodeClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be constructed, e.g. the base URL is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No HTTP response was obtained (connection refused, timeout, DNS...).
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// A response arrived but its body could not be read in full.
    #[error("unable to read response body: {0}")]
    ReadBody(#[source] BoxError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(#[source] serde_json::Error),

    /// A 200/201 body did not match the expected response shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(#[source] serde_json::Error),

    /// A non-success body was not a valid error envelope.
    #[error("unable to read error from response body: {0}")]
    ErrorBody(#[source] serde_json::Error),

    /// The node answered with a non-success status and an error envelope.
    #[error("{kind}: url {url}, error message: {message}")]
    Status {
        kind: ErrorKind,
        status: u16,
        url: String,
        code: i64,
        message: String,
    },

    /// A per-input response list did not line up with the request.
    #[error("expected {expected} entries in response, got {actual}")]
    ResponseLengthMismatch { expected: usize, actual: usize },

    /// A message in a by-hash response carried an undecodable parent hash.
    #[error("message {index} in response is malformed: {source}")]
    InvalidMessage {
        index: usize,
        #[source]
        source: hex::FromHexError,
    },
}

impl ApiError {
    /// The mapped status kind, if the node answered with an error envelope.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
