use chrono::Utc;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::codec::{canonical_json, sha256_hex};
use crate::transaction::Transaction;

use super::merkle::{EMPTY_BLOCK_LEAF, MerkleTree};
use super::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF, GENESIS_TIMESTAMP};

/// A single block in the chain. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64, // seconds since the Unix epoch
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
    pub merkle_root: String,
}

impl Block {
    /// The hard-coded first block. Every node builds the same one, so chains
    /// can be compared by content.
    pub fn genesis() -> Self {
        Self {
            index: 1,
            timestamp: GENESIS_TIMESTAMP,
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            merkle_root: Self::commitment_root(&[]),
        }
    }

    /// Build a block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        let merkle_root = Self::commitment_root(&transactions);
        Self {
            index,
            timestamp: now_secs(),
            transactions,
            proof,
            previous_hash,
            merkle_root,
        }
    }

    /// Merkle root over the transaction digests, or over the `"0"`
    /// placeholder when the block carries no transactions.
    pub fn commitment_root(transactions: &[Transaction]) -> String {
        let leaves: Vec<String> = if transactions.is_empty() {
            vec![EMPTY_BLOCK_LEAF.to_string()]
        } else {
            transactions.iter().map(Transaction::digest_hex).collect()
        };
        let tree = MerkleTree::new(&leaves).expect("commitment leaf set is never empty");
        debug!(
            "MERKLE - root over {} leaves (depth {})",
            tree.leaf_count(),
            tree.depth()
        );
        tree.root_hash().to_string()
    }

    /// Canonical block hash: SHA-256 over the sorted-key JSON encoding of
    /// every field. Independent of field order in memory or on the wire.
    pub fn hash(&self) -> String {
        let bytes = canonical_json(self).expect("block serializes to JSON");
        sha256_hex(&bytes)
    }

    /// True when `merkle_root` matches the block's own transactions.
    /// Not part of chain validity; exposed for inspection.
    pub fn merkle_root_matches(&self) -> bool {
        self.merkle_root == Self::commitment_root(&self.transactions)
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
