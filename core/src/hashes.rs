//! Fixed-size identifiers used in node API queries.
//!
//! Every id renders as lowercase hex and parses back from hex of exactly the
//! right length. On the wire they travel as hex strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LENGTH: usize = $len;

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(
    /// Hash of a message in the tangle.
    MessageHash,
    32
);

hex_id!(
    /// Hash of a signed transaction payload.
    TransactionHash,
    32
);

hex_id!(
    /// Reference to a transaction output: the transaction id followed by the
    /// output index as little-endian u16.
    UtxoInputId,
    34
);

impl UtxoInputId {
    pub fn new(transaction_id: [u8; 32], output_index: u16) -> Self {
        let mut bytes = [0u8; 34];
        bytes[..32].copy_from_slice(&transaction_id);
        bytes[32..].copy_from_slice(&output_index.to_le_bytes());
        Self(bytes)
    }

    pub fn transaction_id(&self) -> [u8; 32] {
        let mut id = [0u8; 32];
        id.copy_from_slice(&self.0[..32]);
        id
    }

    pub fn output_index(&self) -> u16 {
        u16::from_le_bytes([self.0[32], self.0[33]])
    }
}

/// Comma-separated hex of `ids`, in order. Empty input yields an empty string.
pub fn hex_list<T: fmt::Display>(ids: &[T]) -> String {
    ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}
