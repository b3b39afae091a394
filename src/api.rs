//! REST API server for Koban
//!
//! Exposes the node's state and the two write paths (transaction submission,
//! candidate-chain replacement) over HTTP. The core stays a set of pure
//! validate/compute operations; this module is the only place that binds a
//! socket, and malformed request shapes are rejected here by serde before
//! they can reach core logic as typed values.

use axum::{
    extract::{Query, Request, State},
    http,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

use crate::blockchain::{Chain, LedgerState};
use crate::error::Result;
use crate::mempool::Mempool;
use crate::persistence::Persistence;
use crate::sync::Broadcaster;
use crate::transaction::Transaction;

/// Shared state handed to every handler.
///
/// The write half of the ledger lock is held across each whole
/// validate-then-commit sequence, so state transitions are serialized and no
/// reader ever observes a half-replaced chain.
pub struct AppState {
    pub ledger: Arc<RwLock<LedgerState>>,
    pub persistence: Arc<dyn Persistence>,
    pub broadcaster: Arc<Broadcaster>,
}

#[derive(Deserialize)]
struct BroadcastQuery {
    #[serde(default = "default_broadcast")]
    broadcast: String,
}

fn default_broadcast() -> String {
    "on".to_string()
}

impl BroadcastQuery {
    /// Re-propagation is on unless the sender explicitly turned it off, which
    /// is what peers do to keep broadcasts from looping.
    fn enabled(&self) -> bool {
        self.broadcast == "on"
    }
}

/// Request logging middleware: method, path, status, duration.
async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    info!(
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        "api.request"
    );

    response
}

/// Build the API router with all endpoints (for testing)
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![http::Method::GET, http::Method::POST])
        .allow_headers(vec![http::header::CONTENT_TYPE]);

    Router::new()
        .route("/tx-pool", get(get_tx_pool).post(post_tx_pool))
        .route("/chain", get(get_chain).post(post_chain))
        .route("/accounts", get(get_accounts))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
        .layer(cors)
}

/// Binds the listener and serves the API until the process exits.
pub async fn run_api_server(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let ledger = state.ledger.read().await;
    Json(serde_json::json!({
        "status": "healthy",
        "height": ledger.chain().len(),
        "mempool": ledger.mempool().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn get_tx_pool(State(state): State<Arc<AppState>>) -> Json<Mempool> {
    let ledger = state.ledger.read().await;
    Json(ledger.mempool().clone())
}

async fn post_tx_pool(
    State(state): State<Arc<AppState>>,
    Query(flag): Query<BroadcastQuery>,
    Json(tx): Json<Transaction>,
) -> Json<&'static str> {
    let accepted = {
        let mut ledger = state.ledger.write().await;
        let accepted = ledger.submit_transaction(tx.clone());
        if accepted {
            if let Err(e) = state
                .persistence
                .save_state(ledger.chain(), ledger.mempool())
            {
                error!(error = %e, "failed to persist state after transaction");
            }
        }
        accepted
    };

    if accepted && flag.enabled() {
        state.broadcaster.broadcast_transaction(&tx);
    }

    Json(if accepted { "ok" } else { "error" })
}

async fn get_chain(State(state): State<Arc<AppState>>) -> Json<Chain> {
    let ledger = state.ledger.read().await;
    Json(ledger.chain().clone())
}

async fn post_chain(
    State(state): State<Arc<AppState>>,
    Query(flag): Query<BroadcastQuery>,
    Json(candidate): Json<Chain>,
) -> Json<&'static str> {
    let accepted = {
        let mut ledger = state.ledger.write().await;
        let accepted = ledger.replace_chain(candidate.clone());
        if accepted {
            if let Err(e) = state
                .persistence
                .save_state(ledger.chain(), ledger.mempool())
            {
                error!(error = %e, "failed to persist state after chain replacement");
            }
        }
        accepted
    };

    if accepted && flag.enabled() {
        state.broadcaster.broadcast_chain(&candidate);
    }

    Json(if accepted { "ok" } else { "error" })
}

async fn get_accounts(State(state): State<Arc<AppState>>) -> Json<HashMap<String, i64>> {
    let ledger = state.ledger.read().await;
    Json(ledger.balances())
}
