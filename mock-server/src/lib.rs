use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const HASH_LENGTH: usize = 32;
pub const OUTPUT_ID_LENGTH: usize = 34;

/// Ids present in [`NodeState::seeded`].
pub mod seed {
    pub const MESSAGE_A: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    pub const MESSAGE_B: &str = "2222222222222222222222222222222222222222222222222222222222222222";
    pub const MESSAGE_UNKNOWN: &str = "3333333333333333333333333333333333333333333333333333333333333333";
    pub const MILESTONE: &str = "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
    pub const TRANSACTION_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    pub const TRANSACTION_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    pub const OUTPUT_A: &str = "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc0000";
    pub const OUTPUT_B: &str = "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc0100";
    pub const OUTPUT_UNKNOWN: &str = "dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd0000";
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    pub version: String,
    pub is_healthy: bool,
    pub operating_network: String,
    pub peers: u32,
    pub coordinator_address: String,
    pub is_synced: bool,
    pub latest_milestone_hash: String,
    pub latest_milestone_index: u64,
    pub latest_solid_milestone_hash: String,
    pub latest_solid_milestone_index: u64,
    pub pruning_index: u64,
    pub time: u64,
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tips {
    pub tip1: String,
    pub tip2: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub version: u8,
    pub parent1: String,
    pub parent2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub nonce: u64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referenced {
    pub is_referenced_by_milestone: bool,
    pub milestone_index: u64,
    pub milestone_timestamp: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Output {
    pub address: String,
    pub amount: u64,
    pub spent: bool,
}

/// Overrides every route while set.
#[derive(Clone, Debug)]
pub enum Fault {
    /// Answer with `status` and a well-formed error envelope.
    Status { status: u16, message: String },
    /// Answer with `status` and `body` verbatim.
    Raw { status: u16, body: Vec<u8> },
}

#[derive(Clone, Debug)]
pub struct NodeState {
    pub info: NodeInfo,
    pub tips: Tips,
    /// Keyed by lowercase hex.
    pub messages: HashMap<String, Message>,
    pub message_refs: HashMap<String, Referenced>,
    pub transaction_refs: HashMap<String, Referenced>,
    pub outputs: HashMap<String, Output>,
    pub fault: Option<Fault>,
}

impl NodeState {
    pub fn seeded() -> Self {
        let info = NodeInfo {
            name: "mock-node".to_string(),
            version: "0.5.0".to_string(),
            is_healthy: true,
            operating_network: "testnet".to_string(),
            peers: 8,
            coordinator_address: "52fdfc072182654f163f5f0f9a621d729566c74d10037c4d7bbb0407d1e2c649".to_string(),
            is_synced: true,
            latest_milestone_hash: seed::MILESTONE.to_string(),
            latest_milestone_index: 1200,
            latest_solid_milestone_hash: seed::MILESTONE.to_string(),
            latest_solid_milestone_index: 1200,
            pruning_index: 100,
            time: 1_600_000_000,
            features: vec!["pow".to_string()],
        };
        let tips = Tips {
            tip1: seed::MESSAGE_A.to_string(),
            tip2: seed::MESSAGE_B.to_string(),
        };

        let messages = HashMap::from([
            (
                seed::MESSAGE_A.to_string(),
                Message {
                    version: 1,
                    parent1: seed::MESSAGE_B.to_string(),
                    parent2: seed::MILESTONE.to_string(),
                    payload: Some(serde_json::json!({ "type": 2, "index": "6d6f636b", "data": "" })),
                    nonce: 1001,
                },
            ),
            (
                seed::MESSAGE_B.to_string(),
                Message {
                    version: 1,
                    parent1: seed::MILESTONE.to_string(),
                    parent2: seed::MILESTONE.to_string(),
                    payload: None,
                    nonce: 1002,
                },
            ),
        ]);

        let referenced = |index| Referenced {
            is_referenced_by_milestone: true,
            milestone_index: index,
            milestone_timestamp: 1_600_000_000 + index,
        };
        let message_refs = HashMap::from([(seed::MESSAGE_B.to_string(), referenced(1199))]);
        let transaction_refs = HashMap::from([(seed::TRANSACTION_A.to_string(), referenced(1150))]);

        let outputs = HashMap::from([
            (
                seed::OUTPUT_A.to_string(),
                Output {
                    address: "6920b176f613ec7be59e68fc68f597eb3393af80f74c7c3db78198147d5f1f92".to_string(),
                    amount: 1_000_000,
                    spent: false,
                },
            ),
            (
                seed::OUTPUT_B.to_string(),
                Output {
                    address: "efdc112efe262b304bcf379b26c31bad029f616ee3ec4aa6345a366e4c9e43a3".to_string(),
                    amount: 250,
                    spent: true,
                },
            ),
        ]);

        Self {
            info,
            tips,
            messages,
            message_refs,
            transaction_refs,
            outputs,
            fault: None,
        }
    }
}

pub type Node = Arc<RwLock<NodeState>>;

pub fn node(state: NodeState) -> Node {
    Arc::new(RwLock::new(state))
}

pub fn app(node: Node) -> Router {
    Router::new()
        .route("/info", get(info))
        .route("/tips", get(tips))
        .route("/messages/by-hash", get(messages_by_hash))
        .route("/messages/by-hash/is-referenced-by-milestone", get(messages_referenced))
        .route("/transaction-messages/is-confirmed", get(transactions_confirmed))
        .route("/outputs/by-hash", get(outputs_by_hash))
        .layer(middleware::from_fn_with_state(node.clone(), inject_fault))
        .with_state(node)
}

pub async fn run(listener: TcpListener, node: Node) -> Result<(), std::io::Error> {
    axum::serve(listener, app(node)).await
}

#[derive(Serialize)]
struct Data<T> {
    data: T,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: u16,
    message: &'a str,
}

#[derive(Deserialize)]
pub struct HashesQuery {
    #[serde(default)]
    pub hashes: String,
}

fn data<T: Serialize>(value: T) -> Response {
    Json(Data { data: value }).into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = ErrorEnvelope {
        error: ErrorBody {
            code: status.as_u16(),
            message,
        },
    };
    (status, Json(body)).into_response()
}

fn status_or_500(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn inject_fault(State(node): State<Node>, request: Request, next: Next) -> Response {
    let fault = node.read().await.fault.clone();
    match fault {
        Some(Fault::Status { status, message }) => error(status_or_500(status), &message),
        Some(Fault::Raw { status, body }) => (status_or_500(status), body).into_response(),
        None => next.run(request).await,
    }
}

/// Split a comma-separated id list; an empty list is allowed.
fn parse_ids(raw: &str, len: usize) -> Result<Vec<String>, Response> {
    raw.split(',')
        .filter(|id| !id.is_empty())
        .map(|id| match hex::decode(id) {
            Ok(bytes) if bytes.len() == len => Ok(id.to_ascii_lowercase()),
            _ => Err(error(StatusCode::BAD_REQUEST, &format!("invalid id: {id}"))),
        })
        .collect()
}

async fn info(State(node): State<Node>) -> Response {
    data(&node.read().await.info)
}

async fn tips(State(node): State<Node>) -> Response {
    data(&node.read().await.tips)
}

async fn messages_by_hash(
    State(node): State<Node>,
    Query(query): Query<HashesQuery>,
) -> Result<Response, Response> {
    let ids = parse_ids(&query.hashes, HASH_LENGTH)?;
    let state = node.read().await;
    let found: Vec<&Message> = ids.iter().filter_map(|id| state.messages.get(id)).collect();
    Ok(data(found))
}

async fn messages_referenced(
    State(node): State<Node>,
    Query(query): Query<HashesQuery>,
) -> Result<Response, Response> {
    let ids = parse_ids(&query.hashes, HASH_LENGTH)?;
    let state = node.read().await;
    Ok(data(lookup_refs(&state.message_refs, &ids)))
}

async fn transactions_confirmed(
    State(node): State<Node>,
    Query(query): Query<HashesQuery>,
) -> Result<Response, Response> {
    let ids = parse_ids(&query.hashes, HASH_LENGTH)?;
    let state = node.read().await;
    Ok(data(lookup_refs(&state.transaction_refs, &ids)))
}

fn lookup_refs(refs: &HashMap<String, Referenced>, ids: &[String]) -> Vec<Referenced> {
    ids.iter().map(|id| refs.get(id).copied().unwrap_or_default()).collect()
}

async fn outputs_by_hash(
    State(node): State<Node>,
    Query(query): Query<HashesQuery>,
) -> Result<Response, Response> {
    let ids = parse_ids(&query.hashes, OUTPUT_ID_LENGTH)?;
    let state = node.read().await;
    let mut found = Vec::with_capacity(ids.len());
    for id in &ids {
        match state.outputs.get(id) {
            Some(output) => found.push(output),
            None => return Err(error(StatusCode::NOT_FOUND, &format!("output not found: {id}"))),
        }
    }
    Ok(data(found))
}
