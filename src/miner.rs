//! Proof-of-work mining: candidate assembly and the nonce search.

use crate::blockchain::chain::Block;
use crate::error::Result;
use crate::ledger;
use crate::transaction::{RewardTx, Transaction};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// True iff the first `difficulty` characters of the hex digest are all '0'.
pub fn satisfies_difficulty(hash_hex: &str, difficulty: usize) -> bool {
    hash_hex.len() >= difficulty && hash_hex.bytes().take(difficulty).all(|b| b == b'0')
}

/// Cancellation signal for an in-progress nonce search.
///
/// The search polls this every iteration, so a node that receives a longer
/// chain from a peer can abandon mining immediately instead of burning CPU on
/// a stale block. Cancellation is a normal termination, not an error.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Greedy, order-dependent candidate admission.
///
/// Walks the pending transactions in arrival order, tentatively appending each
/// to the running set (everything committed plus everything admitted so far)
/// and recomputing balances. A transaction that would drive any account
/// negative is dropped and never retried within this block. Reordering the
/// pending list can change the outcome; that is the intended policy, not an
/// accident.
pub fn select_candidates(pending: &[Transaction], committed: &[Transaction]) -> Vec<Transaction> {
    let mut running = committed.to_vec();
    let mut admitted = Vec::new();

    for tx in pending {
        running.push(tx.clone());
        if ledger::has_negative_balance(&running) {
            debug!("pending transaction skipped: would overdraw an account");
            running.pop();
            continue;
        }
        admitted.push(tx.clone());
    }

    admitted
}

/// The full transaction list for a candidate block: the admitted pending
/// transactions plus exactly one reward transaction crediting the miner.
pub fn build_block_txs(
    pending: &[Transaction],
    committed: &[Transaction],
    miner_public_key: &str,
    reward: i64,
) -> Vec<Transaction> {
    let mut txs = select_candidates(pending, committed);
    txs.push(Transaction::Reward(RewardTx::new(
        miner_public_key.to_string(),
        reward,
    )));
    txs
}

/// Searches for a nonce whose block hash meets the difficulty target.
///
/// The block is assembled once (current timestamp, nonce 0) and only the nonce
/// varies across iterations. The search is unbounded and single-threaded;
/// `Ok(None)` means it was cancelled before a solution was found.
pub fn mine_block(
    previous_hash: String,
    txs: Vec<Transaction>,
    difficulty: usize,
    cancel: &CancelFlag,
) -> Result<Option<Block>> {
    let mut block = Block::new(previous_hash, txs);

    loop {
        if cancel.is_cancelled() {
            info!(nonce = block.nonce, "mining cancelled");
            return Ok(None);
        }

        let hash = block.hash()?;
        if satisfies_difficulty(&hash, difficulty) {
            info!(nonce = block.nonce, hash = %hash, "mining succeeded");
            return Ok(Some(block));
        }

        block.nonce += 1;
    }
}
