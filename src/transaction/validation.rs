//! Per-transaction soundness and duplicate checks.

use crate::crypto;
use crate::mempool::Mempool;
use crate::transaction::Transaction;
use tracing::debug;

/// Checks a single transaction in isolation.
///
/// A transfer is sound when its amount is non-negative and its signature
/// verifies against the canonical signing payload under the sender's public
/// key. Reward transactions are exempt from signature checking here; their
/// count and amount are enforced by the chain validator, which is the only
/// place with enough context for those rules.
pub fn validate_tx(tx: &Transaction) -> bool {
    if tx.amount() < 0 {
        debug!("transaction rejected: negative amount");
        return false;
    }

    match tx {
        Transaction::Reward(_) => true,
        Transaction::Transfer(transfer) => {
            let payload = match transfer.signing_bytes() {
                Ok(bytes) => bytes,
                Err(_) => return false,
            };
            if !crypto::verify(&payload, &transfer.signature, &transfer.sender) {
                debug!("transaction rejected: bad signature");
                return false;
            }
            true
        }
    }
}

/// True iff an identical record (full structural equality, every field
/// including timestamp and signature) already sits in the mempool or the
/// committed set.
///
/// This record-equality check is the system's entire double-spend/replay
/// defense. Two transfers identical except for timestamp are distinct records
/// and both pass; that gap is intentional and must not be papered over with
/// nonces without revisiting scope.
pub fn is_duplicate(tx: &Transaction, mempool: &Mempool, committed: &[Transaction]) -> bool {
    if mempool.contains(tx) {
        debug!("duplicate transaction already in mempool");
        return true;
    }
    if committed.contains(tx) {
        debug!("duplicate transaction already committed");
        return true;
    }
    false
}
