// Thin re-export module: implementation is split across `blockchain/chain.rs`
// (types, genesis constant, authoritative state) and `blockchain/validation.rs`
// (the candidate-chain gate).

pub mod chain;
pub mod validation;

pub use chain::{
    genesis_block, Block, Chain, ConsensusParams, LedgerState, DEFAULT_DIFFICULTY, DEFAULT_REWARD,
    GENESIS_PREVIOUS_HASH, GENESIS_TIME,
};
pub use validation::validate_chain;
