use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::blockchain::DEFAULT_DIFFICULTY;
use crate::error::{LedgerError, LedgerResult};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;

/// What a node does with the shared ledger: a miner forges blocks and pays
/// itself the reward, a relay only buffers and forwards transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Miner,
    Relay,
}

impl FromStr for NodeRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "miner" => Ok(NodeRole::Miner),
            "relay" | "wallet" | "user" => Ok(NodeRole::Relay),
            other => Err(LedgerError::MalformedInput(format!("unknown NODE_ROLE {other:?}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub role: NodeRole,
    pub difficulty: u32,
    /// Peers registered at startup.
    pub peers: Vec<String>,
    /// Miner a relay forwards signed transactions to.
    pub miner_address: Option<String>,
    pub peer_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            role: NodeRole::Miner,
            difficulty: DEFAULT_DIFFICULTY,
            peers: Vec::new(),
            miner_address: None,
            peer_timeout: Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS),
        }
    }
}

impl NodeConfig {
    /// Read configuration from the process environment (after `.env` has
    /// been loaded by the caller).
    pub fn from_env() -> LedgerResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Missing keys fall back to defaults;
    /// present but unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> LedgerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => parse(&v, "PORT")?,
            None => defaults.port,
        };
        let role = match get("NODE_ROLE") {
            Some(v) => v.parse()?,
            None => defaults.role,
        };
        let difficulty = match get("DIFFICULTY") {
            Some(v) => parse(&v, "DIFFICULTY")?,
            None => defaults.difficulty,
        };
        let peer_timeout = match get("PEER_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse(&v, "PEER_TIMEOUT_SECS")?),
            None => defaults.peer_timeout,
        };
        let peers = get("PEERS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            role,
            difficulty,
            peers,
            miner_address: get("MINER_ADDRESS"),
            peer_timeout,
        })
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> LedgerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LedgerError::MalformedInput(format!("{key}={value:?} is not valid")))
}
