use log::{debug, info};

use crate::error::{LedgerError, LedgerResult};
use crate::transaction::Transaction;

use super::validator::{valid_chain, validate_chain};
use super::{Block, MINING_REWARD, ProofOfWork};

/// In-memory chain plus the pool of transactions waiting for the next block.
///
/// One instance per node, owned by whatever serves requests. The chain is
/// never empty: the genesis block is created on construction.
#[derive(Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    current_transactions: Vec<Transaction>,
    pow: ProofOfWork,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(super::DEFAULT_DIFFICULTY)
    }
}

impl Ledger {
    /// Initialize a ledger holding only the genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis()],
            current_transactions: Vec::new(),
            pow: ProofOfWork::new(difficulty),
        }
    }

    /// Queue a transaction for the next block. Returns the index of the block
    /// that will hold it.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<serde_json::Number>,
    ) -> u64 {
        self.admit(Transaction::new(sender, recipient, amount))
    }

    /// Queue an already-built transaction.
    pub fn admit(&mut self, tx: Transaction) -> u64 {
        debug!(
            "LEDGER - pending tx {} -> {} ({}), pool size now {}",
            tx.sender,
            tx.recipient,
            tx.amount,
            self.current_transactions.len() + 1
        );
        self.current_transactions.push(tx);
        self.last_block().index + 1
    }

    /// Forge a block from the whole pending pool and append it.
    ///
    /// `previous_hash` defaults to the hash of the current last block. The
    /// pool is drained in the same step.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = previous_hash.unwrap_or_else(|| self.last_block().hash());
        let transactions = std::mem::take(&mut self.current_transactions);
        let block = Block::new(self.chain.len() as u64 + 1, transactions, proof, previous_hash);

        info!(
            "LEDGER - appended block #{} (txs={}, proof={})",
            block.index,
            block.transactions.len(),
            block.proof
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Canonical hash of `block`.
    pub fn hash(block: &Block) -> String {
        block.hash()
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger should always hold at least the genesis block")
    }

    /// Search a proof over the last block, reward `reward_recipient` and forge
    /// the block. Blocks the calling thread for the whole search.
    pub fn mine(&mut self, reward_recipient: &str) -> &Block {
        let last = self.last_block();
        let proof = self.pow.proof_of_work(last.proof);
        let previous_hash = last.hash();

        self.new_transaction(crate::transaction::REWARD_SENDER, reward_recipient, MINING_REWARD);
        self.new_block(proof, Some(previous_hash))
    }

    /// Forge a block with a proof found outside the ledger lock.
    ///
    /// `expected_tip` is the hash of the last block the proof was searched
    /// over; if the chain moved since then the work is stale and nothing is
    /// appended.
    pub fn forge(
        &mut self,
        proof: u64,
        expected_tip: &str,
        reward_recipient: &str,
    ) -> LedgerResult<&Block> {
        let tip = self.last_block().hash();
        if tip != expected_tip {
            return Err(LedgerError::StaleTip);
        }
        if !self.pow.valid_proof(self.last_block().proof, proof) {
            return Err(LedgerError::InvalidChain {
                index: self.last_block().index + 1,
                reason: format!("proof {proof} does not solve the current puzzle"),
            });
        }

        self.new_transaction(crate::transaction::REWARD_SENDER, reward_recipient, MINING_REWARD);
        Ok(self.new_block(proof, Some(tip)))
    }

    /// Whether `chain` is structurally valid under this ledger's difficulty.
    pub fn valid_chain(&self, chain: &[Block]) -> bool {
        valid_chain(chain, &self.pow)
    }

    /// Swap in `chain` if it is valid and strictly longer than ours.
    /// Pending transactions are kept.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> LedgerResult<()> {
        if chain.len() <= self.chain.len() {
            return Err(LedgerError::InvalidChain {
                index: chain.len() as u64,
                reason: format!(
                    "candidate length {} does not exceed local length {}",
                    chain.len(),
                    self.chain.len()
                ),
            });
        }
        validate_chain(&chain, &self.pow)?;

        info!(
            "LEDGER - chain replaced: {} -> {} blocks",
            self.chain.len(),
            chain.len()
        );
        self.chain = chain;
        Ok(())
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.current_transactions
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    pub fn difficulty(&self) -> u32 {
        self.pow.difficulty()
    }
}
