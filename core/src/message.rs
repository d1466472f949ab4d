//! Messages returned by `GET /messages/by-hash`.
//!
//! The node sends parents as hex strings and the payload as an opaque JSON
//! object; [`to_messages`] turns the raw list into typed [`Message`]s.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::hashes::MessageHash;

/// Raw wire form of a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonMessage {
    pub version: u8,
    pub parent1: String,
    pub parent2: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub nonce: u64,
}

/// A decoded message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: u8,
    pub parent1: MessageHash,
    pub parent2: MessageHash,
    /// Left undecoded; payload schemas are owned by the ledger types.
    pub payload: Option<serde_json::Value>,
    pub nonce: u64,
}

impl TryFrom<JsonMessage> for Message {
    type Error = hex::FromHexError;

    fn try_from(raw: JsonMessage) -> Result<Self, Self::Error> {
        Ok(Message {
            version: raw.version,
            parent1: raw.parent1.parse()?,
            parent2: raw.parent2.parse()?,
            payload: raw.payload,
            nonce: raw.nonce,
        })
    }
}

/// Decode `raw` in response order. The first malformed entry fails the lot.
pub fn to_messages(raw: Vec<JsonMessage>) -> Result<Vec<Message>, ApiError> {
    raw.into_iter()
        .enumerate()
        .map(|(index, msg)| Message::try_from(msg).map_err(|source| ApiError::InvalidMessage { index, source }))
        .collect()
}
