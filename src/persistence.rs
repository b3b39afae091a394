//! Snapshot persistence for the authoritative `{chain, mempool}` pair.
//!
//! The storage format is a local implementation choice, not a compatibility
//! surface: nodes never exchange snapshot files. What is non-negotiable is the
//! failure mode, since a corrupted snapshot means an untrusted ledger and the
//! node must abort at startup rather than build on it.

use crate::blockchain::{genesis_block, Chain};
use crate::error::{ChainError, Result};
use crate::mempool::Mempool;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// Abstraction for snapshot backends.
pub trait Persistence: Send + Sync {
    fn save_state(&self, chain: &Chain, mempool: &Mempool) -> Result<()>;
    fn load_state(&self) -> Result<(Chain, Mempool)>;
}

/// JSON snapshots at fixed locations under a data directory.
pub struct JsonFileStore {
    chain_path: PathBuf,
    pool_path: PathBuf,
}

impl JsonFileStore {
    pub fn open(data_dir: &str) -> Result<Self> {
        fs::create_dir_all(data_dir).map_err(|e| {
            ChainError::Persistence(format!("Failed to create data dir {}: {}", data_dir, e))
        })?;

        let dir = PathBuf::from(data_dir);
        Ok(JsonFileStore {
            chain_path: dir.join("chain.json"),
            pool_path: dir.join("tx_pool.json"),
        })
    }
}

impl Persistence for JsonFileStore {
    fn save_state(&self, chain: &Chain, mempool: &Mempool) -> Result<()> {
        let chain_json = serde_json::to_string(chain)?;
        let pool_json = serde_json::to_string(mempool)?;

        fs::write(&self.chain_path, chain_json).map_err(|e| {
            ChainError::Persistence(format!("Failed to write {:?}: {}", self.chain_path, e))
        })?;
        fs::write(&self.pool_path, pool_json).map_err(|e| {
            ChainError::Persistence(format!("Failed to write {:?}: {}", self.pool_path, e))
        })?;

        Ok(())
    }

    fn load_state(&self) -> Result<(Chain, Mempool)> {
        let chain = match fs::read_to_string(&self.chain_path) {
            Ok(contents) => serde_json::from_str::<Chain>(&contents).map_err(|e| {
                ChainError::Persistence(format!("Corrupted chain snapshot: {}", e))
            })?,
            // A missing snapshot is a fresh node, not corruption.
            Err(_) => Chain::genesis(),
        };

        if chain.blocks.first() != Some(&genesis_block()) {
            return Err(ChainError::Persistence(
                "Persisted chain does not start with the genesis constant".to_string(),
            ));
        }

        let mempool = match fs::read_to_string(&self.pool_path) {
            Ok(contents) => serde_json::from_str::<Mempool>(&contents).map_err(|e| {
                ChainError::Persistence(format!("Corrupted mempool snapshot: {}", e))
            })?,
            Err(_) => Mempool::new(),
        };

        Ok((chain, mempool))
    }
}

/// In-memory backend for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<Option<(Chain, Mempool)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for InMemoryStore {
    fn save_state(&self, chain: &Chain, mempool: &Mempool) -> Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ChainError::Persistence("Mutex poisoned".to_string()))?;
        *state = Some((chain.clone(), mempool.clone()));
        Ok(())
    }

    fn load_state(&self) -> Result<(Chain, Mempool)> {
        let state = self
            .state
            .lock()
            .map_err(|_| ChainError::Persistence("Mutex poisoned".to_string()))?;
        Ok(state
            .clone()
            .unwrap_or_else(|| (Chain::genesis(), Mempool::new())))
    }
}
