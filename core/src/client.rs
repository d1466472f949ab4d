//! Request builder, response parser and executor for the node REST API.
//!
//! # Design
//! `NodeClient` holds a `base_url` and a shared [`Transport`] and carries no
//! mutable state between calls. Each endpoint is split into a `build_*`
//! method that produces an `HttpRequest`, a `parse_*` method that consumes an
//! `HttpResponse`, and an executing method that runs one round trip through
//! the transport in between. Every response goes through
//! [`interpret_response`], which owns the envelope and status mapping.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ErrorKind};
use crate::hashes::{hex_list, MessageHash, TransactionHash, UtxoInputId};
use crate::http::{BodyMode, HttpMethod, HttpRequest, HttpResponse, CONTENT_TYPE_JSON};
use crate::message::{to_messages, JsonMessage, Message};
use crate::transport::{Transport, TransportConfig, UreqTransport};
use crate::types::{ErrorEnvelope, NodeInfo, Output, ReferencedStatus, SuccessEnvelope, Tips};

const ROUTE_INFO: &str = "/info";
const ROUTE_TIPS: &str = "/tips";
const ROUTE_MESSAGES_BY_HASH: &str = "/messages/by-hash";
const ROUTE_MESSAGES_REFERENCED: &str = "/messages/by-hash/is-referenced-by-milestone";
const ROUTE_TRANSACTIONS_CONFIRMED: &str = "/transaction-messages/is-confirmed";
const ROUTE_OUTPUTS_BY_HASH: &str = "/outputs/by-hash";

/// Blocking client for a node's REST API.
///
/// Clones share the transport. One instance may be used from several
/// threads at once; each call is an independent round trip.
#[derive(Clone)]
pub struct NodeClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl NodeClient {
    /// Client on a default [`UreqTransport`]. The URL is not validated here;
    /// a malformed one fails each call with `ApiError::InvalidRequest`.
    pub fn new(base_url: &str) -> Self {
        Self::with_config(base_url, &TransportConfig::default())
    }

    pub fn with_config(base_url: &str, config: &TransportConfig) -> Self {
        Self::with_transport(base_url, Arc::new(UreqTransport::new(config)))
    }

    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `route`, serializing `payload` as the JSON body.
    pub fn build_request<Req: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        route: &str,
        payload: Option<&Req>,
    ) -> Result<HttpRequest, ApiError> {
        let body = payload
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::SerializationError)?;
        let headers = match body {
            Some(_) => vec![("content-type".to_string(), CONTENT_TYPE_JSON.to_string())],
            None => Vec::new(),
        };
        Ok(HttpRequest {
            method,
            url: format!("{}{route}", self.base_url),
            headers,
            body,
        })
    }

    /// One round trip, decoding the `data` of a success envelope into `Res`.
    pub fn call<Req: Serialize + ?Sized, Res: DeserializeOwned>(
        &self,
        method: HttpMethod,
        route: &str,
        payload: Option<&Req>,
    ) -> Result<Res, ApiError> {
        let request = self.build_request(method, route, payload)?;
        interpret_response(self.execute(&request, BodyMode::Read)?)
    }

    /// One round trip that succeeds once any response arrives. The body is
    /// never read and the status is not inspected.
    pub fn send<Req: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        route: &str,
        payload: Option<&Req>,
    ) -> Result<(), ApiError> {
        let request = self.build_request(method, route, payload)?;
        self.execute(&request, BodyMode::Discard)?;
        Ok(())
    }

    fn execute(&self, request: &HttpRequest, mode: BodyMode) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending node api request");
        let response = self.transport.execute(request, mode)?;
        debug!(status = response.status, url = %response.url, "node api responded");
        Ok(response)
    }

    fn get(&self, route: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{route}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn get_with_hashes<T: fmt::Display>(&self, route: &str, ids: &[T]) -> HttpRequest {
        self.get(&format!("{route}?hashes={}", hex_list(ids)))
    }

    pub fn build_info(&self) -> HttpRequest {
        self.get(ROUTE_INFO)
    }

    pub fn parse_info(&self, response: HttpResponse) -> Result<NodeInfo, ApiError> {
        interpret_response(response)
    }

    /// Name, version, health and milestone state of the node.
    pub fn info(&self) -> Result<NodeInfo, ApiError> {
        let request = self.build_info();
        self.parse_info(self.execute(&request, BodyMode::Read)?)
    }

    pub fn build_tips(&self) -> HttpRequest {
        self.get(ROUTE_TIPS)
    }

    pub fn parse_tips(&self, response: HttpResponse) -> Result<Tips, ApiError> {
        interpret_response(response)
    }

    /// Two tips to attach a new message to.
    pub fn tips(&self) -> Result<Tips, ApiError> {
        let request = self.build_tips();
        self.parse_tips(self.execute(&request, BodyMode::Read)?)
    }

    pub fn build_messages_by_hash(&self, hashes: &[MessageHash]) -> HttpRequest {
        self.get_with_hashes(ROUTE_MESSAGES_BY_HASH, hashes)
    }

    pub fn parse_messages_by_hash(&self, response: HttpResponse) -> Result<Vec<Message>, ApiError> {
        let raw: Vec<JsonMessage> = interpret_response(response)?;
        to_messages(raw)
    }

    /// Messages known to the node, in the order the node returned them.
    /// Unknown hashes may simply be absent from the result.
    pub fn messages_by_hash(&self, hashes: &[MessageHash]) -> Result<Vec<Message>, ApiError> {
        let request = self.build_messages_by_hash(hashes);
        self.parse_messages_by_hash(self.execute(&request, BodyMode::Read)?)
    }

    pub fn build_are_messages_referenced_by_milestone(&self, hashes: &[MessageHash]) -> HttpRequest {
        self.get_with_hashes(ROUTE_MESSAGES_REFERENCED, hashes)
    }

    pub fn parse_are_messages_referenced_by_milestone(
        &self,
        hashes: &[MessageHash],
        response: HttpResponse,
    ) -> Result<Vec<ReferencedStatus>, ApiError> {
        parse_aligned(hashes.len(), response)
    }

    /// Milestone status of each message; entry `i` belongs to `hashes[i]`.
    pub fn are_messages_referenced_by_milestone(
        &self,
        hashes: &[MessageHash],
    ) -> Result<Vec<ReferencedStatus>, ApiError> {
        let request = self.build_are_messages_referenced_by_milestone(hashes);
        self.parse_are_messages_referenced_by_milestone(hashes, self.execute(&request, BodyMode::Read)?)
    }

    pub fn build_are_transactions_referenced_by_milestone(&self, hashes: &[TransactionHash]) -> HttpRequest {
        self.get_with_hashes(ROUTE_TRANSACTIONS_CONFIRMED, hashes)
    }

    pub fn parse_are_transactions_referenced_by_milestone(
        &self,
        hashes: &[TransactionHash],
        response: HttpResponse,
    ) -> Result<Vec<ReferencedStatus>, ApiError> {
        parse_aligned(hashes.len(), response)
    }

    /// Milestone status of each transaction; entry `i` belongs to `hashes[i]`.
    pub fn are_transactions_referenced_by_milestone(
        &self,
        hashes: &[TransactionHash],
    ) -> Result<Vec<ReferencedStatus>, ApiError> {
        let request = self.build_are_transactions_referenced_by_milestone(hashes);
        self.parse_are_transactions_referenced_by_milestone(hashes, self.execute(&request, BodyMode::Read)?)
    }

    pub fn build_outputs_by_hash(&self, ids: &[UtxoInputId]) -> HttpRequest {
        self.get_with_hashes(ROUTE_OUTPUTS_BY_HASH, ids)
    }

    pub fn parse_outputs_by_hash(&self, response: HttpResponse) -> Result<Vec<Output>, ApiError> {
        interpret_response(response)
    }

    pub fn outputs_by_hash(&self, ids: &[UtxoInputId]) -> Result<Vec<Output>, ApiError> {
        let request = self.build_outputs_by_hash(ids);
        self.parse_outputs_by_hash(self.execute(&request, BodyMode::Read)?)
    }
}

/// Decode a node response.
///
/// 200 and 201 carry `{ "data": T }`. Anything else must carry an error
/// envelope, which becomes `ApiError::Status`; if it does not, the result is
/// `ApiError::ErrorBody`.
pub fn interpret_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    if response.status == 200 || response.status == 201 {
        let envelope: SuccessEnvelope<T> =
            serde_json::from_slice(&response.body).map_err(ApiError::DeserializationError)?;
        return Ok(envelope.data);
    }

    let envelope: ErrorEnvelope = serde_json::from_slice(&response.body).map_err(ApiError::ErrorBody)?;
    let kind = ErrorKind::from_status(response.status);
    debug!(status = response.status, %kind, url = %response.url, "node api returned an error");
    Err(ApiError::Status {
        kind,
        status: response.status,
        url: response.url,
        code: envelope.error.code,
        message: envelope.error.message,
    })
}

fn parse_aligned(expected: usize, response: HttpResponse) -> Result<Vec<ReferencedStatus>, ApiError> {
    let statuses: Vec<ReferencedStatus> = interpret_response(response)?;
    if statuses.len() != expected {
        return Err(ApiError::ResponseLengthMismatch {
            expected,
            actual: statuses.len(),
        });
    }
    Ok(statuses)
}
