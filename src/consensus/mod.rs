//! Longest-valid-chain conflict resolution.
//!
//! Fetching remote chains is split from applying them: fetches run without
//! touching the ledger, then [`resolve_conflicts`] picks a winner and swaps
//! it in while the caller holds the ledger exclusively.

pub mod client;
pub mod peers;

use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Ledger};
use crate::error::{LedgerError, LedgerResult};

pub use client::HttpPeerClient;
pub use peers::PeerSet;

/// What a peer reports for `GET /chain/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl ChainResponse {
    pub fn new(chain: Vec<Block>) -> Self {
        Self {
            length: chain.len(),
            chain,
        }
    }

    /// Reject responses that cannot be a chain: no genesis, or a reported
    /// length that disagrees with the blocks actually sent.
    pub fn check_shape(&self) -> LedgerResult<()> {
        if self.chain.is_empty() {
            return Err(LedgerError::MalformedInput("peer sent an empty chain".into()));
        }
        if self.length != self.chain.len() {
            return Err(LedgerError::MalformedInput(format!(
                "reported length {} but sent {} blocks",
                self.length,
                self.chain.len()
            )));
        }
        Ok(())
    }
}

/// Chain query interface: given a peer endpoint, return its chain.
#[allow(async_fn_in_trait)]
pub trait ChainSource {
    async fn fetch_chain(&self, peer: &str) -> LedgerResult<ChainResponse>;
}

/// One peer's answer, successful or not.
#[derive(Debug, Clone)]
pub struct PeerChain {
    pub peer: String,
    pub response: LedgerResult<ChainResponse>,
}

/// Query every peer concurrently. Each fetch is independent and read-only.
pub async fn fetch_chains<S: ChainSource>(source: &S, peers: &[String]) -> Vec<PeerChain> {
    join_all(peers.iter().map(|peer| async move {
        PeerChain {
            peer: peer.clone(),
            response: source.fetch_chain(peer).await,
        }
    }))
    .await
}

/// Replace the ledger's chain with the longest valid one among `responses`.
///
/// Only chains strictly longer than the current maximum (starting at our own
/// length) are candidates. Failed or malformed responses are skipped.
/// Responses are examined in ascending peer order, so between equally long
/// valid chains the lowest endpoint wins. Returns whether a replacement
/// happened.
pub fn resolve_conflicts(ledger: &mut Ledger, mut responses: Vec<PeerChain>) -> bool {
    responses.sort_by(|a, b| a.peer.cmp(&b.peer));

    let mut max_length = ledger.len();
    let mut new_chain: Option<(String, Vec<Block>)> = None;

    for PeerChain { peer, response } in responses {
        let resp = match response.and_then(|r| r.check_shape().map(|_| r)) {
            Ok(r) => r,
            Err(err) => {
                warn!("CONSENSUS - skipping peer {peer}: {err}");
                continue;
            }
        };

        debug!(
            "CONSENSUS - peer {peer} reports length {} (current max {max_length})",
            resp.length
        );
        if resp.length > max_length && ledger.valid_chain(&resp.chain) {
            max_length = resp.length;
            new_chain = Some((peer, resp.chain));
        }
    }

    match new_chain {
        Some((peer, chain)) => match ledger.replace_chain(chain) {
            Ok(()) => {
                info!("CONSENSUS - adopted chain of length {max_length} from {peer}");
                true
            }
            Err(err) => {
                warn!("CONSENSUS - candidate from {peer} rejected on swap: {err}");
                false
            }
        },
        None => {
            info!("CONSENSUS - local chain is authoritative (length {max_length})");
            false
        }
    }
}
