use log::debug;

use crate::codec::sha256_hex;

use super::DEFAULT_DIFFICULTY;

/// How many candidates are tried between two cancellation checks.
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Proof-of-work puzzle over two integers: find `proof` such that
/// `sha256("{last_proof}{proof}")` starts with `difficulty` zero hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn valid_proof(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{last_proof}{proof}");
        let guess_hash = sha256_hex(guess.as_bytes());
        guess_hash
            .chars()
            .take(self.difficulty as usize)
            .all(|c| c == '0')
    }

    /// Smallest non-negative `proof` satisfying [`ProofOfWork::valid_proof`].
    /// Blocks the calling thread until found.
    pub fn proof_of_work(&self, last_proof: u64) -> u64 {
        let mut proof = 0;
        while !self.valid_proof(last_proof, proof) {
            proof += 1;
        }
        proof
    }

    /// Same scan as [`ProofOfWork::proof_of_work`], but polls `cancelled`
    /// periodically and gives up with `None` once it returns true.
    pub fn search<F>(&self, last_proof: u64, cancelled: F) -> Option<u64>
    where
        F: Fn() -> bool,
    {
        let mut proof = 0u64;
        loop {
            if proof % CANCEL_CHECK_INTERVAL == 0 && cancelled() {
                debug!("POW - search over last_proof={last_proof} cancelled at {proof}");
                return None;
            }
            if self.valid_proof(last_proof, proof) {
                return Some(proof);
            }
            proof += 1;
        }
    }
}
