pub mod block;
pub mod merkle;
pub mod model;
pub mod pow;
pub mod validator;

pub use block::Block;
pub use merkle::MerkleTree;
pub use model::Ledger;
pub use pow::ProofOfWork;
pub use validator::{valid_chain, validate_chain};

/// Default Proof-of-Work difficulty (number of leading zero hex digits).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Coins paid to the miner of each block.
pub const MINING_REWARD: u64 = 1;

/// Network-agreed genesis values.
pub const GENESIS_PROOF: u64 = 100;
pub const GENESIS_PREVIOUS_HASH: &str = "1";
pub const GENESIS_TIMESTAMP: f64 = 0.0;
