//! Aggregate balance computation.

use crate::transaction::{Transaction, REWARD_SENDER};
use std::collections::HashMap;

/// Computes the balance of every account touched by `txs`.
///
/// Every sender and recipient seen starts at zero; each transaction debits its
/// sender and credits its recipient. The virtual `"reward"` account absorbs
/// all issuance (and so runs arbitrarily negative); it is dropped from the
/// returned map because it is not a real account.
///
/// Totals are order-independent over a fixed transaction set.
pub fn balances(txs: &[Transaction]) -> HashMap<String, i64> {
    let mut accounts: HashMap<String, i64> = HashMap::new();
    accounts.insert(REWARD_SENDER.to_string(), 0);

    for tx in txs {
        *accounts.entry(tx.sender().to_string()).or_insert(0) -= tx.amount();
        *accounts.entry(tx.recipient().to_string()).or_insert(0) += tx.amount();
    }

    accounts.remove(REWARD_SENDER);
    accounts
}

/// True iff any real account would end up below zero.
pub fn has_negative_balance(txs: &[Transaction]) -> bool {
    balances(txs).values().any(|balance| *balance < 0)
}
