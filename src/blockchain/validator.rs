use log::{debug, warn};

use crate::error::{LedgerError, LedgerResult};

use super::{Block, ProofOfWork};

/// Walk `chain` pairwise and check link hashes and proofs of work.
///
/// Only structure and proof-of-work are checked; Merkle roots and
/// transaction contents are not part of chain validity. The chain must
/// contain at least the genesis block.
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> LedgerResult<()> {
    if chain.is_empty() {
        return Err(LedgerError::MalformedInput(
            "chain must contain at least the genesis block".into(),
        ));
    }

    for pair in chain.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        debug!(
            "VALIDATOR - checking block #{} against #{}",
            curr.index, prev.index
        );

        if curr.previous_hash != prev.hash() {
            return Err(LedgerError::InvalidChain {
                index: curr.index,
                reason: "previous_hash does not match hash of preceding block".into(),
            });
        }

        if !pow.valid_proof(prev.proof, curr.proof) {
            return Err(LedgerError::InvalidChain {
                index: curr.index,
                reason: format!(
                    "proof {} does not solve puzzle over previous proof {}",
                    curr.proof, prev.proof
                ),
            });
        }
    }

    Ok(())
}

/// Boolean view of [`validate_chain`].
pub fn valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    match validate_chain(chain, pow) {
        Ok(()) => true,
        Err(err) => {
            warn!("VALIDATOR - rejected chain of length {}: {err}", chain.len());
            false
        }
    }
}
