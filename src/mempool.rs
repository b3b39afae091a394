//! Pending transaction pool.

use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Pool of pending, not-yet-committed transactions in arrival order.
///
/// Arrival order is load-bearing: the miner's greedy candidate admission walks
/// the pool front to back, so reordering changes which transactions fit into
/// the next block.
///
/// The wire form `{"txs": [...]}` is shared with peers and with the persisted
/// snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mempool {
    pub txs: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn contains(&self, tx: &Transaction) -> bool {
        self.txs.contains(tx)
    }

    /// Appends a transaction. Validation happens in the ledger state before
    /// this is called; the pool itself stays dumb.
    pub fn push(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    /// Drops every transaction that now appears in the committed set,
    /// preserving the arrival order of the rest.
    pub fn prune_committed(&mut self, committed: &[Transaction]) {
        self.txs.retain(|tx| !committed.contains(tx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransferTx;

    fn transfer(sender: &str, amount: i64) -> Transaction {
        Transaction::Transfer(TransferTx {
            time: 0,
            sender: sender.to_string(),
            to: "b".to_string(),
            amount,
            signature: "sig".to_string(),
        })
    }

    #[test]
    fn test_push_and_contains() {
        let mut pool = Mempool::new();
        let tx = transfer("a", 1);
        assert!(!pool.contains(&tx));

        pool.push(tx.clone());
        assert!(pool.contains(&tx));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_prune_preserves_arrival_order() {
        let mut pool = Mempool::new();
        let first = transfer("a", 1);
        let second = transfer("b", 2);
        let third = transfer("c", 3);
        pool.push(first.clone());
        pool.push(second.clone());
        pool.push(third.clone());

        pool.prune_committed(std::slice::from_ref(&second));
        assert_eq!(pool.txs, vec![first, third]);
    }
}
