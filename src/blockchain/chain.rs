use crate::canonical;
use crate::error::Result;
use crate::ledger;
use crate::mempool::Mempool;
use crate::transaction::{is_duplicate, validate_tx, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default proof-of-work difficulty: leading zero hex digits required of an
/// accepted block hash.
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Default block subsidy.
pub const DEFAULT_REWARD: i64 = 50;

/// Timestamp of the genesis block, Unix milliseconds. Part of the genesis
/// constant every holder must agree on byte for byte.
pub const GENESIS_TIME: u64 = 1_736_575_754_072;

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "none";

/// Consensus constants supplied by configuration. Fixed for the lifetime of a
/// network; all validation and mining is pure given these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusParams {
    pub difficulty: usize,
    pub reward: i64,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        ConsensusParams {
            difficulty: DEFAULT_DIFFICULTY,
            reward: DEFAULT_REWARD,
        }
    }
}

/// A block of transactions linked to its predecessor by hash.
///
/// The field order is the canonical encoding and must not change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Unix milliseconds.
    pub time: u64,
    /// Hex digest of the previous block, or `"none"` for genesis.
    pub previous_hash: String,
    pub nonce: u64,
    pub txs: Vec<Transaction>,
}

impl Block {
    /// Assembles an unmined block (nonce 0) stamped with the current time.
    pub fn new(previous_hash: String, txs: Vec<Transaction>) -> Self {
        Block {
            time: chrono::Utc::now().timestamp_millis() as u64,
            previous_hash,
            nonce: 0,
            txs,
        }
    }

    /// Hex digest of the canonical encoding of the whole block.
    pub fn hash(&self) -> Result<String> {
        canonical::hash(self)
    }
}

/// The fixed first block shared by all parties: no transactions, nonce 0, and
/// a sentinel previous hash.
pub fn genesis_block() -> Block {
    Block {
        time: GENESIS_TIME,
        previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        nonce: 0,
        txs: Vec::new(),
    }
}

/// An ordered list of blocks. Wire form `{"blocks": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chain {
    pub blocks: Vec<Block>,
}

impl Chain {
    /// A chain holding only the genesis block.
    pub fn genesis() -> Self {
        Chain {
            blocks: vec![genesis_block()],
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Every transaction ever committed, in chain order.
    pub fn committed_txs(&self) -> Vec<Transaction> {
        self.blocks
            .iter()
            .flat_map(|block| block.txs.iter().cloned())
            .collect()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Chain::genesis()
    }
}

/// The authoritative `{chain, mempool}` pair owned by a node.
///
/// All state transitions go through this context object; there is no global
/// state. Callers needing concurrent access wrap it in a lock and hold the
/// write half across a whole read-validate-commit sequence, so no reader can
/// observe a half-replaced chain.
#[derive(Debug, Clone)]
pub struct LedgerState {
    chain: Chain,
    mempool: Mempool,
    /// Flattened copy of every committed transaction, rebuilt on replacement.
    committed: Vec<Transaction>,
    params: ConsensusParams,
}

impl LedgerState {
    pub fn new(chain: Chain, mempool: Mempool, params: ConsensusParams) -> Self {
        let committed = chain.committed_txs();
        LedgerState {
            chain,
            mempool,
            committed,
            params,
        }
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn committed_txs(&self) -> &[Transaction] {
        &self.committed
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// Balance of every real account over all committed transactions.
    pub fn balances(&self) -> std::collections::HashMap<String, i64> {
        ledger::balances(&self.committed)
    }

    /// Validates an incoming transaction and admits it to the mempool.
    /// Returns false (and leaves the pool untouched) on an unsound or
    /// duplicate transaction.
    pub fn submit_transaction(&mut self, tx: Transaction) -> bool {
        if !validate_tx(&tx) {
            return false;
        }
        if is_duplicate(&tx, &self.mempool, &self.committed) {
            return false;
        }
        self.mempool.push(tx);
        true
    }

    /// Replaces the local chain with a candidate if it passes full validation.
    ///
    /// On acceptance the chain is swapped wholesale (never patched in place),
    /// the committed set is rebuilt, and every newly committed transaction is
    /// pruned from the mempool. The caller is expected to persist the
    /// resulting `{chain, mempool}` pair.
    pub fn replace_chain(&mut self, candidate: Chain) -> bool {
        if !super::validation::validate_chain(&candidate, &self.chain, &self.params) {
            debug!("candidate chain rejected");
            return false;
        }

        self.chain = candidate;
        self.committed = self.chain.committed_txs();
        self.mempool.prune_committed(&self.committed);

        info!(
            height = self.chain.len(),
            mempool = self.mempool.len(),
            "chain replaced"
        );
        true
    }
}
