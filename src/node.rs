//! Node orchestration: configuration, persistence, and the API server.

use crate::api::{run_api_server, AppState};
use crate::blockchain::LedgerState;
use crate::config::Config;
use crate::error::{ChainError, Result};
use crate::persistence::{JsonFileStore, Persistence};
use crate::sync::Broadcaster;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

pub struct Node {
    pub config: Config,
    pub persistence: Arc<dyn Persistence>,
    pub ledger: Arc<RwLock<LedgerState>>,
    pub broadcaster: Arc<Broadcaster>,
}

impl Node {
    /// Builds a node from configuration, restoring persisted state.
    ///
    /// A corrupted snapshot aborts startup here: a node must not operate on a
    /// ledger it cannot trust. A missing snapshot simply starts from genesis.
    pub fn init(config: Config) -> Result<Self> {
        let persistence: Arc<dyn Persistence> =
            Arc::new(JsonFileStore::open(&config.storage.data_dir)?);

        let (chain, mempool) = persistence.load_state()?;
        info!(
            height = chain.len(),
            mempool = mempool.len(),
            "restored ledger state"
        );

        let ledger = Arc::new(RwLock::new(LedgerState::new(
            chain,
            mempool,
            config.consensus.params(),
        )));
        let broadcaster = Arc::new(Broadcaster::new(config.network.peers.clone()));

        Ok(Node {
            config,
            persistence,
            ledger,
            broadcaster,
        })
    }

    /// Serves the API until the process exits.
    pub async fn start(self) -> Result<()> {
        let host = self.config.network.bind_host.parse().map_err(|e| {
            ChainError::Config(format!(
                "Invalid bind host {:?}: {}",
                self.config.network.bind_host, e
            ))
        })?;
        let addr = SocketAddr::new(host, self.config.network.port);

        info!(
            peers = self.config.network.peers.len(),
            difficulty = self.config.consensus.difficulty,
            "starting Koban node"
        );

        let state = Arc::new(AppState {
            ledger: self.ledger,
            persistence: self.persistence,
            broadcaster: self.broadcaster,
        });

        run_api_server(state, addr).await
    }
}
