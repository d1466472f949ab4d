//! End-to-end tests against the live mock node.
//!
//! # Design
//! Each test starts its own mock node on a random port, so faults injected by
//! one test never leak into another, then drives `NodeClient` over real HTTP
//! through the default ureq transport.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::JoinHandle;

use mock_node::{seed, Fault, Node, NodeState};
use node_api_client::{
    ApiError, ErrorKind, HttpMethod, MessageHash, NodeClient, Output, TransactionHash, TransportConfig,
    UtxoInputId,
};

/// Serve `state` on a random port from a background thread.
fn start(state: NodeState) -> (SocketAddr, Node) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let node = mock_node::node(state);
    let served = node.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_node::run(listener, served).await
        })
        .unwrap();
    });

    (addr, node)
}

fn client_for(addr: SocketAddr) -> NodeClient {
    NodeClient::new(&format!("http://{addr}"))
}

fn with_fault(fault: Fault) -> NodeClient {
    let mut state = NodeState::seeded();
    state.fault = Some(fault);
    let (addr, _node) = start(state);
    client_for(addr)
}

/// Accept a single connection, answer it with `response` and return the raw
/// request bytes that were received.
fn serve_once(response: Vec<u8>) -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        stream.write_all(&response).unwrap();
        request
    });
    (addr, handle)
}

/// Read one request: the head, then `content-length` bytes of body.
fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            return buf;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|value| value.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                return buf;
            }
        }
    }
}

fn json_response(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

/// A `{"data":[..outputs..]}` body of at least `min_len` bytes.
fn large_outputs_body(min_len: usize) -> Vec<u8> {
    let entry = format!(r#"{{"address":"{}","amount":1,"spent":false}}"#, "a".repeat(1000));
    let count = min_len / entry.len() + 1;
    let entries = vec![entry; count].join(",");
    format!(r#"{{"data":[{entries}]}}"#).into_bytes()
}

fn message_hash(hex: &str) -> MessageHash {
    hex.parse().unwrap()
}

#[test]
fn info_and_tips() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    let info = client.info().unwrap();
    assert_eq!(info.name, "mock-node");
    assert_eq!(info.version, "0.5.0");
    assert!(info.is_healthy);
    assert!(info.is_synced);
    assert_eq!(info.peers, 8);
    assert_eq!(info.latest_milestone_hash, seed::MILESTONE);
    assert_eq!(info.features, vec!["pow".to_string()]);

    let tips = client.tips().unwrap();
    assert_eq!(tips.tip1, seed::MESSAGE_A);
    assert_eq!(tips.tip2, seed::MESSAGE_B);
}

#[test]
fn messages_by_hash_decodes_known_messages() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    let hashes = [
        message_hash(seed::MESSAGE_A),
        message_hash(seed::MESSAGE_UNKNOWN),
        message_hash(seed::MESSAGE_B),
    ];
    let msgs = client.messages_by_hash(&hashes).unwrap();
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].parent1, message_hash(seed::MESSAGE_B));
    assert_eq!(msgs[0].parent2, message_hash(seed::MILESTONE));
    assert!(msgs[0].payload.is_some());
    assert_eq!(msgs[1].nonce, 1002);
    assert!(msgs[1].payload.is_none());
}

#[test]
fn messages_referenced_by_milestone_are_aligned() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    let hashes = [
        message_hash(seed::MESSAGE_UNKNOWN),
        message_hash(seed::MESSAGE_B),
        message_hash(seed::MESSAGE_A),
    ];
    let statuses = client.are_messages_referenced_by_milestone(&hashes).unwrap();
    assert_eq!(statuses.len(), 3);
    assert_eq!(statuses[0].milestone(), None);
    let milestone = statuses[1].milestone().unwrap();
    assert_eq!(milestone.index, 1199);
    assert_eq!(milestone.timestamp, 1_600_001_199);
    assert_eq!(statuses[2].milestone(), None);
}

#[test]
fn transactions_referenced_by_milestone() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    let hashes: Vec<TransactionHash> = [seed::TRANSACTION_A, seed::TRANSACTION_B]
        .iter()
        .map(|h| h.parse().unwrap())
        .collect();
    let statuses = client.are_transactions_referenced_by_milestone(&hashes).unwrap();
    assert_eq!(statuses.len(), 2);
    assert!(statuses[0].is_referenced_by_milestone);
    assert_eq!(statuses[0].milestone_index, 1150);
    assert!(!statuses[1].is_referenced_by_milestone);
}

#[test]
fn empty_hash_list_round_trips() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    assert!(client.are_messages_referenced_by_milestone(&[]).unwrap().is_empty());
    assert!(client.messages_by_hash(&[]).unwrap().is_empty());
}

#[test]
fn outputs_by_hash() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    let ids = [
        UtxoInputId::new([0xcc; 32], 1),
        UtxoInputId::new([0xcc; 32], 0),
    ];
    let outputs = client.outputs_by_hash(&ids).unwrap();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].amount, 250);
    assert!(outputs[0].spent);
    assert_eq!(outputs[1].amount, 1_000_000);
    assert!(!outputs[1].spent);
}

#[test]
fn unknown_output_maps_to_not_found() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    let unknown: UtxoInputId = seed::OUTPUT_UNKNOWN.parse().unwrap();
    let err = client.outputs_by_hash(&[unknown]).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    let text = err.to_string();
    assert!(text.contains("output not found"), "{text}");
    assert!(text.contains("/outputs/by-hash?hashes="), "{text}");
}

#[test]
fn every_mapped_status_is_surfaced() {
    let cases = [
        (400, ErrorKind::BadRequest),
        (401, ErrorKind::Unauthorized),
        (404, ErrorKind::NotFound),
        (500, ErrorKind::InternalServerError),
        (501, ErrorKind::NotImplemented),
        (418, ErrorKind::Unknown),
    ];
    for (status, expected) in cases {
        let client = with_fault(Fault::Status {
            status,
            message: format!("injected {status}"),
        });
        let err = client.info().unwrap_err();
        assert_eq!(err.kind(), Some(expected), "{status}");
        assert!(err.to_string().contains(&format!("injected {status}")), "{status}: {err}");
    }
}

#[test]
fn malformed_error_body_is_distinct() {
    let client = with_fault(Fault::Raw {
        status: 503,
        body: b"<html>maintenance</html>".to_vec(),
    });
    let err = client.tips().unwrap_err();
    assert!(matches!(err, ApiError::ErrorBody(_)), "{err:?}");
}

#[test]
fn created_status_is_a_success() {
    let client = with_fault(Fault::Raw {
        status: 201,
        body: br#"{"data":{"tip1":"aa","tip2":"bb"}}"#.to_vec(),
    });
    let tips = client.tips().unwrap();
    assert_eq!(tips.tip1, "aa");
}

#[test]
fn fire_and_forget_against_empty_body() {
    let client = with_fault(Fault::Raw {
        status: 200,
        body: Vec::new(),
    });
    client.send::<()>(HttpMethod::Get, "/info", None).unwrap();
    client
        .send(HttpMethod::Post, "/messages", Some(&serde_json::json!({ "version": 1 })))
        .unwrap();
}

#[test]
fn bodies_beyond_ten_mebibytes_are_read_in_full() {
    let body = large_outputs_body(11 * 1024 * 1024);
    let client = with_fault(Fault::Raw { status: 200, body });

    let outputs: Vec<Output> = client
        .call::<(), _>(HttpMethod::Get, "/outputs/by-hash?hashes=", None)
        .unwrap();
    assert!(outputs.len() > 11_000);
    assert_eq!(outputs[0].amount, 1);
}

#[test]
fn configured_body_limit_is_enforced() {
    let mut state = NodeState::seeded();
    state.fault = Some(Fault::Raw {
        status: 200,
        body: large_outputs_body(64 * 1024),
    });
    let (addr, _node) = start(state);
    let config = TransportConfig {
        body_limit: Some(1024),
        ..TransportConfig::default()
    };
    let client = NodeClient::with_config(&format!("http://{addr}"), &config);

    let err = client
        .call::<(), Vec<Output>>(HttpMethod::Get, "/outputs/by-hash?hashes=", None)
        .unwrap_err();
    assert!(matches!(err, ApiError::ReadBody(_)), "{err:?}");
}

#[test]
fn non_utf8_error_body_is_an_error_body_failure() {
    let client = with_fault(Fault::Raw {
        status: 500,
        body: vec![0xff, 0xfe, 0x00],
    });
    let err = client.info().unwrap_err();
    assert!(matches!(err, ApiError::ErrorBody(_)), "{err:?}");
}

#[test]
fn non_utf8_success_body_is_a_deserialization_error() {
    let client = with_fault(Fault::Raw {
        status: 200,
        body: vec![0xff, 0xfe, 0x00],
    });
    let err = client.tips().unwrap_err();
    assert!(matches!(err, ApiError::DeserializationError(_)), "{err:?}");
}

#[test]
fn get_with_payload_sends_the_body() {
    let (addr, server) = serve_once(json_response(r#"{"data":{"tip1":"a","tip2":"b"}}"#));
    let client = client_for(addr);

    let tips: node_api_client::Tips = client
        .call(HttpMethod::Get, "/tips", Some(&serde_json::json!({ "a": 1 })))
        .unwrap();
    assert_eq!(tips.tip1, "a");

    let request = String::from_utf8(server.join().unwrap()).unwrap();
    assert!(request.starts_with("GET /tips "), "{request}");
    assert!(request.to_ascii_lowercase().contains("content-type: application/json"), "{request}");
    assert!(request.ends_with(r#"{"a":1}"#), "{request}");
}

#[test]
fn post_with_payload_sends_the_body() {
    let (addr, server) = serve_once(json_response(r#"{"data":{"tip1":"a","tip2":"b"}}"#));
    let client = client_for(addr);

    client
        .send(HttpMethod::Post, "/messages", Some(&serde_json::json!({ "version": 1 })))
        .unwrap();

    let request = String::from_utf8(server.join().unwrap()).unwrap();
    assert!(request.starts_with("POST /messages "), "{request}");
    assert!(request.ends_with(r#"{"version":1}"#), "{request}");
}

#[test]
fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let client = client_for(addr);

    let err = client.info().unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert_eq!(err.kind(), None);
}

#[test]
fn malformed_base_url_fails_at_call_time() {
    let client = NodeClient::new("not a url");
    let err = client.info().unwrap_err();
    assert!(
        matches!(err, ApiError::InvalidRequest(_) | ApiError::Transport(_)),
        "{err:?}"
    );
}

#[test]
fn one_client_many_threads() {
    let (addr, _node) = start(NodeState::seeded());
    let client = client_for(addr);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            std::thread::spawn(move || client.info().map(|info| info.name))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), "mock-node");
    }
}
