//! Koban - a minimal single-currency proof-of-work ledger
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Block and chain types, the genesis constant, chain
//!   validation and replacement
//! - [`transaction`] - Transaction types and validation
//! - [`ledger`] - Aggregate balance computation
//! - [`mempool`] - Pending transaction pool
//!
//! ## Consensus & Mining
//! - [`miner`] - Proof-of-work search and candidate assembly
//!
//! ## Cryptography
//! - [`canonical`] - Deterministic encoding and hashing
//! - [`crypto`] - Keypairs, signatures and verification (secp256k1)
//!
//! ## Node & Integration
//! - [`api`] - REST API server (axum)
//! - [`node`] - Node orchestration
//! - [`sync`] - Peer client and fire-and-forget broadcast
//! - [`persistence`] - Snapshot storage for `{chain, mempool}`
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod ledger;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod canonical;
pub mod crypto;

// ============================================================================
// Node & Integration
// ============================================================================
pub mod api;
pub mod node;
pub mod persistence;
pub mod sync;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
