use std::time::Duration;

use log::debug;
use serde::Serialize;

use super::{ChainResponse, ChainSource};
use crate::error::{LedgerError, LedgerResult};

/// Path every node serves its chain on.
pub const CHAIN_PATH: &str = "/api/v1/chain/";
/// Path a miner accepts signed transactions on.
pub const SIGNED_TX_PATH: &str = "/api/v1/transactions/signed/";

/// HTTP client used to talk to other nodes. One attempt per call, no retry.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    client: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> LedgerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::MalformedInput(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    /// POST a signed transaction to `miner`'s admission route.
    pub async fn forward_signed<T: Serialize>(&self, miner: &str, body: &T) -> LedgerResult<()> {
        let url = format!("http://{miner}{SIGNED_TX_PATH}");
        debug!("PEER - forwarding signed transaction to {url}");
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| unavailable(miner, e))?;
        if !resp.status().is_success() {
            return Err(LedgerError::PeerUnavailable {
                peer: miner.to_string(),
                reason: format!("status {}", resp.status()),
            });
        }
        Ok(())
    }
}

impl ChainSource for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> LedgerResult<ChainResponse> {
        let url = format!("http://{peer}{CHAIN_PATH}");
        debug!("PEER - GET {url}");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(peer, e))?;

        if !resp.status().is_success() {
            return Err(LedgerError::PeerUnavailable {
                peer: peer.to_string(),
                reason: format!("status {}", resp.status()),
            });
        }

        resp.json::<ChainResponse>()
            .await
            .map_err(|e| LedgerError::MalformedInput(format!("chain from {peer}: {e}")))
    }
}

fn unavailable(peer: &str, err: reqwest::Error) -> LedgerError {
    LedgerError::PeerUnavailable {
        peer: peer.to_string(),
        reason: err.to_string(),
    }
}
