//! Blocking client for a ledger node's REST API.
//!
//! # Overview
//! [`NodeClient`] issues one request/response round trip per call against
//! the node's JSON endpoints (`/info`, `/tips`, message and output lookups,
//! milestone checks) and decodes the `{ "data": .. }` / `{ "error": .. }`
//! envelopes every response is wrapped in.
//!
//! # Design
//! - `NodeClient` is stateless apart from its `base_url` and a shared
//!   [`Transport`]; there is no caching and no retrying.
//! - Each endpoint is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so hosts can perform the I/O
//!   themselves; the plain methods run both around the transport.
//! - Non-success statuses map onto a closed [`ErrorKind`] carried by
//!   [`ApiError::Status`].
//! - DTOs are defined independently from the mock-node crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod hashes;
pub mod http;
pub mod message;
pub mod transport;
pub mod types;

pub use client::{interpret_response, NodeClient};
pub use error::{ApiError, ErrorKind};
pub use hashes::{MessageHash, TransactionHash, UtxoInputId};
pub use http::{BodyMode, HttpMethod, HttpRequest, HttpResponse};
pub use message::{JsonMessage, Message};
pub use transport::{Transport, TransportConfig, UreqTransport};
pub use types::{MilestoneRef, NodeInfo, Output, ReferencedStatus, Tips};
