//! Response DTOs and the envelopes every node response is wrapped in.
//!
//! # Design
//! These types mirror the mock node's schema but are defined independently.
//! Integration tests catch any drift between the two crates.

use serde::{Deserialize, Serialize};

/// `{ "data": T }`, returned with 200 and 201.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub data: T,
}

/// `{ "error": { "code": .., "message": .. } }`, returned with any other status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: i64,
    pub message: String,
}

/// Response of `GET /info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    /// Name of the node software.
    pub name: String,
    /// Semver version of the node software.
    pub version: String,
    pub is_healthy: bool,
    /// Network the node operates in.
    pub operating_network: String,
    /// Number of currently connected peers.
    pub peers: u32,
    pub coordinator_address: String,
    pub is_synced: bool,
    pub latest_milestone_hash: String,
    pub latest_milestone_index: u64,
    pub latest_solid_milestone_hash: String,
    pub latest_solid_milestone_index: u64,
    /// Milestone index at which the last pruning commenced.
    pub pruning_index: u64,
    /// Current time from the node's point of view.
    pub time: u64,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Response of `GET /tips`: two hex encoded message hashes to attach to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tips {
    pub tip1: String,
    pub tip2: String,
}

/// Whether an object is referenced by a milestone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReferencedStatus {
    pub is_referenced_by_milestone: bool,
    #[serde(default)]
    pub milestone_index: u64,
    #[serde(default)]
    pub milestone_timestamp: u64,
}

/// The milestone that referenced an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneRef {
    pub index: u64,
    pub timestamp: u64,
}

impl ReferencedStatus {
    /// The referencing milestone; `None` while unreferenced, whatever the
    /// index and timestamp fields hold.
    pub fn milestone(&self) -> Option<MilestoneRef> {
        self.is_referenced_by_milestone.then_some(MilestoneRef {
            index: self.milestone_index,
            timestamp: self.milestone_timestamp,
        })
    }
}

/// A UTXO as reported by `GET /outputs/by-hash`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Output {
    /// Address the output deposits to.
    pub address: String,
    pub amount: u64,
    pub spent: bool,
}
