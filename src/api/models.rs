use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::blockchain::{Block, Ledger, ProofOfWork};
use crate::config::{NodeConfig, NodeRole};
use crate::consensus::{HttpPeerClient, PeerSet};
use crate::error::LedgerResult;
use crate::transaction::Transaction;
use crate::wallet::Secp256k1Authenticator;

/// Shared application state: the node's single ledger plus what it needs to
/// talk to peers.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
    pub peers: Mutex<PeerSet>,
    /// Recipient of this node's mining rewards.
    pub node_id: String,
    pub role: NodeRole,
    pub miner_address: Option<String>,
    /// Bumped whenever the chain tip changes; in-flight mining polls it.
    pub tip_epoch: AtomicU64,
    pub client: HttpPeerClient,
    pub authenticator: Secp256k1Authenticator,
}

impl AppState {
    pub fn new(config: &NodeConfig) -> LedgerResult<Self> {
        let mut peers = PeerSet::new();
        for p in &config.peers {
            peers.register(p)?;
        }
        Ok(Self {
            ledger: Mutex::new(Ledger::new(config.difficulty)),
            peers: Mutex::new(peers),
            node_id: uuid::Uuid::new_v4().simple().to_string(),
            role: config.role,
            miner_address: config.miner_address.clone(),
            tip_epoch: AtomicU64::new(0),
            client: HttpPeerClient::new(config.peer_timeout)?,
            authenticator: Secp256k1Authenticator::default(),
        })
    }

    pub fn epoch(&self) -> u64 {
        self.tip_epoch.load(Ordering::SeqCst)
    }

    /// Callers hold the ledger lock while bumping, so a snapshot taken under
    /// that lock always pairs a tip with its own epoch.
    pub fn bump_epoch(&self) {
        self.tip_epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Tip, puzzle and epoch read under one ledger lock.
    pub fn mining_snapshot(&self) -> MiningSnapshot {
        let ledger = self.ledger.lock().expect("mutex poisoned");
        let last = ledger.last_block();
        MiningSnapshot {
            last_proof: last.proof,
            tip: last.hash(),
            pow: *ledger.pow(),
            epoch: self.epoch(),
        }
    }
}

/// What a mining attempt works against.
#[derive(Debug, Clone)]
pub struct MiningSnapshot {
    pub last_proof: u64,
    pub tip: String,
    pub pow: ProofOfWork,
    pub epoch: u64,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainView<'a> {
    pub chain: &'a [Block],
    pub length: usize,
}

#[derive(Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    /// Indexes of blocks whose `merkle_root` does not match their
    /// transactions. Informational: not part of chain validity.
    pub merkle_mismatches: Vec<u64>,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
    pub merkle_root: String,
}

/* ---------- TX API Models ---------- */

/// Fields are optional so a missing one yields a readable 400.
#[derive(Deserialize)]
pub struct NewTxRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<serde_json::Number>,
}

#[derive(Serialize, Deserialize)]
pub struct SignedTxRequest {
    pub transaction: Transaction,
    /// Hex DER ECDSA signature over the transaction's canonical encoding.
    pub signature: String,
    /// Hex compressed secp256k1 public key of the sender.
    pub public_key: String,
}

#[derive(Serialize, Deserialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Node API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterNodesResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ResolveResponse {
    pub message: String,
    pub replaced: bool,
    pub chain: Vec<Block>,
}
