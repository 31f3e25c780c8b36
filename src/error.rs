use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures surfaced by the ledger core and its collaborators.
///
/// An empty chain is not represented here: the chain always holds the
/// genesis block, so hitting one is a bug and panics instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A transaction or a peer response that does not have the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A candidate chain failed a link-hash or proof-of-work check.
    #[error("invalid chain at block {index}: {reason}")]
    InvalidChain { index: u64, reason: String },

    /// A peer could not be reached or answered with a non-success status.
    #[error("peer {peer} unavailable: {reason}")]
    PeerUnavailable { peer: String, reason: String },

    /// The chain tip moved while a proof was being searched.
    #[error("chain tip changed while mining; work discarded")]
    StaleTip,

    /// Signature or public key rejected by the transaction authenticator.
    #[error("authentication failed: {0}")]
    Authentication(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::MalformedInput(err.to_string())
    }
}
