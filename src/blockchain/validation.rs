//! Full-chain validation: the gate every candidate chain must pass before it
//! can replace the local one.

use crate::blockchain::chain::{genesis_block, Chain, ConsensusParams};
use crate::ledger;
use crate::miner::satisfies_difficulty;
use crate::transaction::{validate_tx, Transaction};
use std::collections::HashSet;
use tracing::debug;

/// Validates a candidate chain against the local one.
///
/// A candidate is accepted only if it is strictly longer (ties rejected, not
/// merely ignored), starts with the untouched genesis constant, every block
/// links to the hash of its predecessor and meets the difficulty target,
/// reward transactions appear at most once per block with the fixed amount,
/// every transfer is sound, no transaction record repeats anywhere across the
/// candidate, and no account's final balance is negative.
///
/// Any single failure aborts immediately with false; there is no partial
/// acceptance. Pure given its inputs, so independent candidates can be checked
/// concurrently over consistent snapshots.
pub fn validate_chain(candidate: &Chain, local: &Chain, params: &ConsensusParams) -> bool {
    // Strictly longer wins; an equal-length candidate is rejected outright.
    if candidate.len() <= local.len() {
        debug!(
            candidate = candidate.len(),
            local = local.len(),
            "candidate not strictly longer"
        );
        return false;
    }

    if candidate.blocks.first() != Some(&genesis_block()) {
        debug!("candidate genesis tampered");
        return false;
    }

    // Running de-duplication set spanning every block of the candidate.
    let mut seen: HashSet<&Transaction> = HashSet::new();

    for i in 1..candidate.blocks.len() {
        let block = &candidate.blocks[i];
        let previous = &candidate.blocks[i - 1];

        let previous_hash = match previous.hash() {
            Ok(hash) => hash,
            Err(_) => return false,
        };
        if block.previous_hash != previous_hash {
            debug!(index = i, "broken previous-hash link");
            return false;
        }

        let block_hash = match block.hash() {
            Ok(hash) => hash,
            Err(_) => return false,
        };
        if !satisfies_difficulty(&block_hash, params.difficulty) {
            debug!(index = i, "insufficient proof of work");
            return false;
        }

        let mut reward_seen = false;
        for tx in &block.txs {
            match tx {
                Transaction::Reward(reward) => {
                    if reward_seen {
                        debug!(index = i, "second reward transaction in block");
                        return false;
                    }
                    reward_seen = true;

                    if reward.amount != params.reward {
                        debug!(index = i, amount = reward.amount, "mis-valued reward");
                        return false;
                    }
                }
                Transaction::Transfer(_) => {
                    if !validate_tx(tx) {
                        debug!(index = i, "unsound transfer");
                        return false;
                    }
                }
            }

            if !seen.insert(tx) {
                debug!(index = i, "transaction reused within candidate");
                return false;
            }
        }
    }

    if ledger::has_negative_balance(&candidate.committed_txs()) {
        debug!("candidate drives an account balance negative");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::chain::{genesis_block, Block};
    use crate::crypto::KeyPair;
    use crate::miner;
    use crate::miner::CancelFlag;
    use crate::transaction::{RewardTx, TransferTx};

    // Difficulty 1 keeps the nonce searches in these tests instant.
    fn test_params() -> ConsensusParams {
        ConsensusParams {
            difficulty: 1,
            reward: 50,
        }
    }

    fn mined_block(previous: &Block, txs: Vec<Transaction>, params: &ConsensusParams) -> Block {
        miner::mine_block(
            previous.hash().unwrap(),
            txs,
            params.difficulty,
            &CancelFlag::new(),
        )
        .unwrap()
        .expect("mining was not cancelled")
    }

    fn extend(chain: &Chain, txs: Vec<Transaction>, params: &ConsensusParams) -> Chain {
        let mut next = chain.clone();
        let block = mined_block(chain.last_block().unwrap(), txs, params);
        next.blocks.push(block);
        next
    }

    fn reward_tx(miner: &str, amount: i64) -> Transaction {
        Transaction::Reward(RewardTx::new(miner.to_string(), amount))
    }

    #[test]
    fn test_mined_extension_accepted() {
        let params = test_params();
        let local = Chain::genesis();
        let candidate = extend(&local, vec![reward_tx("miner", 50)], &params);

        assert!(validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_equal_length_rejected() {
        let params = test_params();
        let local = Chain::genesis();
        let candidate = Chain::genesis();

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_shorter_rejected() {
        let params = test_params();
        let local = extend(&Chain::genesis(), vec![reward_tx("miner", 50)], &params);

        assert!(!validate_chain(&Chain::genesis(), &local, &params));
    }

    #[test]
    fn test_tampered_genesis_rejected() {
        let params = test_params();
        let local = Chain::genesis();

        let mut candidate = extend(&local, vec![reward_tx("miner", 50)], &params);
        candidate.blocks[0].nonce = 1;

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_broken_link_rejected() {
        let params = test_params();
        let local = Chain::genesis();

        let mut candidate = extend(&local, vec![reward_tx("miner", 50)], &params);
        candidate = extend(&candidate, vec![reward_tx("miner", 50)], &params);
        candidate.blocks[1].previous_hash = "0".repeat(64);

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_insufficient_difficulty_rejected() {
        let params = test_params();
        let local = Chain::genesis();
        let candidate = extend(&local, vec![reward_tx("miner", 50)], &params);

        let strict = ConsensusParams {
            difficulty: 64,
            reward: 50,
        };
        assert!(!validate_chain(&candidate, &local, &strict));
    }

    #[test]
    fn test_mis_valued_reward_rejected() {
        let params = test_params();
        let local = Chain::genesis();
        let candidate = extend(&local, vec![reward_tx("miner", 51)], &params);

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_double_reward_rejected() {
        let params = test_params();
        let local = Chain::genesis();
        let candidate = extend(
            &local,
            vec![reward_tx("miner", 50), reward_tx("miner", 50)],
            &params,
        );

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_reused_transaction_rejected() {
        let params = test_params();
        let keypair = KeyPair::generate();

        let mut funding = TransferTx::new(keypair.public_key_hex(), "bb".to_string(), 0);
        funding.sign(&keypair).unwrap();
        let funding = Transaction::Transfer(funding);

        let local = Chain::genesis();
        let mut candidate = extend(
            &local,
            vec![funding.clone(), reward_tx("miner-1", 50)],
            &params,
        );
        // Same record embedded a second time, in a later block.
        candidate = extend(&candidate, vec![funding, reward_tx("miner-2", 50)], &params);

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_overspending_chain_rejected() {
        let params = test_params();
        let keypair = KeyPair::generate();

        let reward = reward_tx(&keypair.public_key_hex(), 50);
        let mut overspend = TransferTx::new(keypair.public_key_hex(), "bb".to_string(), 60);
        overspend.sign(&keypair).unwrap();

        let local = Chain::genesis();
        let mut candidate = extend(&local, vec![reward], &params);
        candidate = extend(
            &candidate,
            vec![
                Transaction::Transfer(overspend),
                reward_tx("other-miner", 50),
            ],
            &params,
        );

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_unsound_transfer_rejected() {
        let params = test_params();
        let keypair = KeyPair::generate();

        let mut tx = TransferTx::new(keypair.public_key_hex(), "bb".to_string(), 0);
        tx.sign(&keypair).unwrap();
        tx.amount = 10; // mutated after signing

        let local = Chain::genesis();
        let candidate = extend(
            &local,
            vec![Transaction::Transfer(tx), reward_tx("miner", 50)],
            &params,
        );

        assert!(!validate_chain(&candidate, &local, &params));
    }

    #[test]
    fn test_genesis_block_alone_never_beats_local() {
        let params = test_params();
        let local = Chain::genesis();
        let empty = Chain { blocks: Vec::new() };

        assert!(!validate_chain(&empty, &local, &params));
    }
}
