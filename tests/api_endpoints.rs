//! Integration tests for the Koban API endpoints.
//!
//! These drive the axum router end to end: submission, duplicate rejection,
//! chain replacement with mempool reconciliation, and boundary rejection of
//! malformed request shapes.

use axum_test::TestServer;
use koban::api::{build_router, AppState};
use koban::blockchain::{Chain, ConsensusParams, LedgerState};
use koban::crypto::KeyPair;
use koban::mempool::Mempool;
use koban::miner::{build_block_txs, mine_block, CancelFlag};
use koban::persistence::InMemoryStore;
use koban::sync::Broadcaster;
use koban::transaction::{Transaction, TransferTx};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

// Difficulty 1 keeps the mined fixtures fast.
fn test_params() -> ConsensusParams {
    ConsensusParams {
        difficulty: 1,
        reward: 50,
    }
}

fn test_server() -> TestServer {
    let state = Arc::new(AppState {
        ledger: Arc::new(RwLock::new(LedgerState::new(
            Chain::genesis(),
            Mempool::new(),
            test_params(),
        ))),
        persistence: Arc::new(InMemoryStore::new()),
        broadcaster: Arc::new(Broadcaster::new(Vec::new())),
    });

    TestServer::new(build_router(state)).expect("Failed to create test server")
}

fn signed_transfer(keypair: &KeyPair, to: &str, amount: i64) -> Transaction {
    let mut tx = TransferTx::new(keypair.public_key_hex(), to.to_string(), amount);
    tx.sign(keypair).unwrap();
    Transaction::Transfer(tx)
}

/// Mines a block crediting `miner_key` on top of `chain`, including `pending`.
fn mined_extension(chain: &Chain, pending: &[Transaction], miner_key: &str) -> Chain {
    let params = test_params();
    let committed = chain.committed_txs();
    let txs = build_block_txs(pending, &committed, miner_key, params.reward);

    let previous_hash = chain.last_block().unwrap().hash().unwrap();
    let block = mine_block(previous_hash, txs, params.difficulty, &CancelFlag::new())
        .unwrap()
        .expect("mining was not cancelled");

    let mut next = chain.clone();
    next.blocks.push(block);
    next
}

#[tokio::test]
async fn test_read_endpoints() {
    let server = test_server();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["height"], 1);
    assert!(json["timestamp"].is_string());

    let response = server.get("/chain").await;
    assert_eq!(response.status_code(), 200);
    let chain: Chain = response.json();
    assert_eq!(chain, Chain::genesis());

    let response = server.get("/tx-pool").await;
    assert_eq!(response.status_code(), 200);
    let pool: Mempool = response.json();
    assert!(pool.is_empty());

    let response = server.get("/accounts").await;
    assert_eq!(response.status_code(), 200);
    let accounts: Value = response.json();
    assert_eq!(accounts, serde_json::json!({}));
}

#[tokio::test]
async fn test_transaction_submission_and_duplicate_rejection() {
    let server = test_server();
    let keypair = KeyPair::generate();
    let tx = signed_transfer(&keypair, "recipient", 0);

    let response = server.post("/tx-pool").json(&tx).await;
    assert_eq!(response.status_code(), 200);
    let reply: String = response.json();
    assert_eq!(reply, "ok");

    let pool: Mempool = server.get("/tx-pool").await.json();
    assert_eq!(pool.len(), 1);

    // Byte-identical resubmission is the replay case and must bounce.
    let response = server.post("/tx-pool").json(&tx).await;
    let reply: String = response.json();
    assert_eq!(reply, "error");

    let pool: Mempool = server.get("/tx-pool").await.json();
    assert_eq!(pool.len(), 1);
}

#[tokio::test]
async fn test_unsigned_transfer_rejected() {
    let server = test_server();
    let keypair = KeyPair::generate();

    let tx = Transaction::Transfer(TransferTx::new(
        keypair.public_key_hex(),
        "recipient".to_string(),
        5,
    ));

    let response = server.post("/tx-pool").json(&tx).await;
    let reply: String = response.json();
    assert_eq!(reply, "error");
}

#[tokio::test]
async fn test_malformed_bodies_rejected_at_boundary() {
    let server = test_server();

    // Not JSON at all.
    let response = server
        .post("/tx-pool")
        .text("{not json")
        .content_type("application/json")
        .await;
    assert_eq!(response.status_code(), 400);

    // Valid JSON, wrong shape.
    let response = server
        .post("/tx-pool")
        .json(&serde_json::json!({"foo": 1}))
        .await;
    assert_eq!(response.status_code(), 422);

    // A reward record smuggling a real signature.
    let response = server
        .post("/tx-pool")
        .json(&serde_json::json!({
            "time": 1, "sender": "reward", "to": "x", "amount": 50,
            "signature": "deadbeef"
        }))
        .await;
    assert_eq!(response.status_code(), 422);
}

#[tokio::test]
async fn test_chain_replacement_and_mempool_reconciliation() {
    let server = test_server();
    let miner = KeyPair::generate();

    // Block 1: fund the miner.
    let funded = mined_extension(&Chain::genesis(), &[], &miner.public_key_hex());
    let response = server
        .post("/chain")
        .add_query_param("broadcast", "off")
        .json(&funded)
        .await;
    let reply: String = response.json();
    assert_eq!(reply, "ok");

    let accounts: Value = server.get("/accounts").await.json();
    assert_eq!(accounts[miner.public_key_hex()], 50);

    // Submit a transfer, then mine it into block 2 (credited elsewhere, so
    // the two reward records cannot collide).
    let tx = signed_transfer(&miner, "recipient", 20);
    let reply: String = server.post("/tx-pool").json(&tx).await.json();
    assert_eq!(reply, "ok");

    let extended = mined_extension(&funded, std::slice::from_ref(&tx), "other-miner");
    let reply: String = server
        .post("/chain")
        .add_query_param("broadcast", "off")
        .json(&extended)
        .await
        .json();
    assert_eq!(reply, "ok");

    // The committed transfer is gone from the pool.
    let pool: Mempool = server.get("/tx-pool").await.json();
    assert!(pool.is_empty());

    let accounts: Value = server.get("/accounts").await.json();
    assert_eq!(accounts[miner.public_key_hex()], 30);
    assert_eq!(accounts["other-miner"], 50);
    assert_eq!(accounts["recipient"], 20);
}

#[tokio::test]
async fn test_equal_length_candidate_rejected() {
    let server = test_server();
    let miner = KeyPair::generate();

    let first = mined_extension(&Chain::genesis(), &[], &miner.public_key_hex());
    let reply: String = server.post("/chain").json(&first).await.json();
    assert_eq!(reply, "ok");

    // A competing block at the same height: strictly-longer means ties lose.
    let rival = mined_extension(&Chain::genesis(), &[], &miner.public_key_hex());
    let reply: String = server.post("/chain").json(&rival).await.json();
    assert_eq!(reply, "error");

    let chain: Chain = server.get("/chain").await.json();
    assert_eq!(chain, first);
}

#[tokio::test]
async fn test_tampered_candidate_rejected() {
    let server = test_server();
    let miner = KeyPair::generate();

    let mut candidate = mined_extension(&Chain::genesis(), &[], &miner.public_key_hex());
    // Bump the reward after mining: the chain stays linked but the reward
    // amount check must catch it.
    if let Transaction::Reward(reward) = &mut candidate.blocks[1].txs[0] {
        reward.amount += 1;
    }

    let reply: String = server.post("/chain").json(&candidate).await.json();
    assert_eq!(reply, "error");

    let chain: Chain = server.get("/chain").await.json();
    assert_eq!(chain, Chain::genesis());
}
