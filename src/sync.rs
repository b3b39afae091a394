//! Peer communication: fetching remote state and fire-and-forget broadcast.

use crate::blockchain::Chain;
use crate::error::Result;
use crate::mempool::Mempool;
use crate::transaction::Transaction;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::debug;

/// Per-request timeout for all peer traffic.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on concurrently in-flight broadcast requests.
const MAX_IN_FLIGHT: usize = 8;

/// HTTP client for talking to a single peer node.
#[derive(Debug, Clone, Default)]
pub struct PeerClient {
    client: reqwest::Client,
}

impl PeerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the peer's full chain.
    pub async fn fetch_chain(&self, peer: &str) -> Result<Chain> {
        let url = format!("http://{}/chain", peer);
        let chain = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .json::<Chain>()
            .await?;
        Ok(chain)
    }

    /// Fetches the peer's pending transaction pool.
    pub async fn fetch_tx_pool(&self, peer: &str) -> Result<Mempool> {
        let url = format!("http://{}/tx-pool", peer);
        let pool = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .json::<Mempool>()
            .await?;
        Ok(pool)
    }

    /// Submits a transaction; the peer answers `"ok"` or `"error"`.
    pub async fn submit_transaction(&self, peer: &str, tx: &Transaction) -> Result<String> {
        let url = format!("http://{}/tx-pool", peer);
        let reply = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(tx)
            .send()
            .await?
            .json::<String>()
            .await?;
        Ok(reply)
    }

    /// Submits a candidate chain; the peer answers `"ok"` or `"error"`.
    pub async fn submit_chain(&self, peer: &str, chain: &Chain) -> Result<String> {
        let url = format!("http://{}/chain", peer);
        let reply = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(chain)
            .send()
            .await?
            .json::<String>()
            .await?;
        Ok(reply)
    }
}

/// Fire-and-forget re-propagation to the configured peer list.
///
/// Each broadcast spawns one task per peer through a bounded pool of permits;
/// every request carries `broadcast=off` so peers do not re-propagate in a
/// loop. At-most-once delivery: no acknowledgment wait, no retry, failures are
/// logged at debug and dropped. Callers get no ordering or delivery guarantee.
pub struct Broadcaster {
    client: reqwest::Client,
    peers: Vec<String>,
    permits: Arc<Semaphore>,
}

impl Broadcaster {
    pub fn new(peers: Vec<String>) -> Self {
        Broadcaster {
            client: reqwest::Client::new(),
            peers,
            permits: Arc::new(Semaphore::new(MAX_IN_FLIGHT)),
        }
    }

    pub fn broadcast_transaction(&self, tx: &Transaction) {
        self.dispatch("tx-pool", tx);
    }

    pub fn broadcast_chain(&self, chain: &Chain) {
        self.dispatch("chain", chain);
    }

    fn dispatch<T: Serialize>(&self, endpoint: &str, body: &T) {
        let body = match serde_json::to_value(body) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "broadcast body failed to serialize");
                return;
            }
        };

        for peer in &self.peers {
            let url = format!("http://{}/{}?broadcast=off", peer, endpoint);
            let client = self.client.clone();
            let permits = self.permits.clone();
            let body = body.clone();

            tokio::spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                if let Err(e) = client
                    .post(&url)
                    .timeout(REQUEST_TIMEOUT)
                    .json(&body)
                    .send()
                    .await
                {
                    debug!(url = %url, error = %e, "broadcast dropped");
                }
            });
        }
    }
}
