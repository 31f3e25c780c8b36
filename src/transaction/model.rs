use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::codec::{canonical_json, sha256, sha256_hex};

/// Sender used for mining rewards: the coin comes from nowhere.
pub const REWARD_SENDER: &str = "0";

/// A value transfer waiting in the pool or committed in a block.
/// No balance or sign checks happen here; this is bookkeeping only, so
/// `amount` is any JSON number, negative and fractional values included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: Number,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    pub fn reward(recipient: impl Into<String>, amount: impl Into<Number>) -> Self {
        Self::new(REWARD_SENDER, recipient, amount)
    }

    /// Sorted-key JSON encoding. This is what gets signed and what the
    /// Merkle leaves commit to.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        canonical_json(self).expect("transaction serializes to JSON")
    }

    /// SHA-256 of the canonical encoding (signing message).
    pub fn sighash(&self) -> [u8; 32] {
        sha256(&self.canonical_bytes())
    }

    /// Hex form of [`Transaction::sighash`], used as the Merkle leaf value.
    pub fn digest_hex(&self) -> String {
        sha256_hex(&self.canonical_bytes())
    }
}
