use std::collections::BTreeSet;

use reqwest::Url;

use crate::error::{LedgerError, LedgerResult};

/// Known peer endpoints as `host:port`. Kept ordered so every walk over the
/// set visits peers in the same sequence.
#[derive(Debug, Default, Clone)]
pub struct PeerSet {
    nodes: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer given as `http://host:port`, `host:port` or similar.
    /// Returns the normalized endpoint.
    pub fn register(&mut self, address: &str) -> LedgerResult<String> {
        let netloc = normalize(address)?;
        self.nodes.insert(netloc.clone());
        Ok(netloc)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.nodes.iter().cloned().collect()
    }
}

fn normalize(address: &str) -> LedgerResult<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::MalformedInput("empty node address".into()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(&with_scheme)
        .map_err(|e| LedgerError::MalformedInput(format!("invalid node address {address:?}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| LedgerError::MalformedInput(format!("node address {address:?} has no host")))?;

    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
