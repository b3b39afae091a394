#![forbid(unsafe_code)]
//! Standalone miner client for Koban
//!
//! Fetches the current chain and transaction pool from a node, assembles a
//! candidate block, runs the proof-of-work search, and submits the extended
//! chain back. While the search runs, a watcher polls the node; if a longer
//! chain lands there first, the search is cancelled instead of finishing a
//! stale block.

use clap::Parser;
use koban::blockchain::{validate_chain, Chain, ConsensusParams};
use koban::miner::{build_block_txs, mine_block, CancelFlag};
use koban::sync::PeerClient;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(author, version, about = "Mine one block and submit it", long_about = None)]
struct Cli {
    /// Node address as host:port
    #[arg(long, default_value = "127.0.0.1:8000")]
    node: String,

    /// Public key credited with the block reward, hex
    #[arg(long)]
    miner_key: String,

    /// Required leading zero hex digits; must match the network
    #[arg(long, default_value_t = 4)]
    difficulty: usize,

    /// Block reward amount; must match the network
    #[arg(long, default_value_t = 50)]
    reward: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let params = ConsensusParams {
        difficulty: cli.difficulty,
        reward: cli.reward,
    };

    let client = PeerClient::new();
    let chain = client.fetch_chain(&cli.node).await?;

    // Never build on a chain the node could not have accepted itself.
    // Validating against an empty local chain applies every structural check
    // without a length constraint.
    let empty = Chain { blocks: Vec::new() };
    if !validate_chain(&chain, &empty, &params) {
        return Err("fetched chain failed validation, refusing to mine on it".into());
    }

    let pool = client.fetch_tx_pool(&cli.node).await?;
    let committed = chain.committed_txs();
    let txs = build_block_txs(&pool.txs, &committed, &cli.miner_key, cli.reward);

    let previous_hash = chain
        .last_block()
        .ok_or("fetched chain is empty")?
        .hash()?;

    println!(
        "mining on height {} with {} transactions",
        chain.len(),
        txs.len()
    );

    // Watch the node while searching: a longer chain arriving there makes
    // this block stale, so abandon the search instead of finishing it.
    let cancel = CancelFlag::new();
    let watcher = {
        let cancel = cancel.clone();
        let client = client.clone();
        let node = cli.node.clone();
        let local_height = chain.len();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(2)).await;
                if let Ok(remote) = client.fetch_chain(&node).await {
                    if remote.len() > local_height {
                        cancel.cancel();
                        break;
                    }
                }
            }
        })
    };

    let search_cancel = cancel.clone();
    let difficulty = cli.difficulty;
    let started = Instant::now();
    let mined = tokio::task::spawn_blocking(move || {
        mine_block(previous_hash, txs, difficulty, &search_cancel)
    })
    .await??;
    watcher.abort();

    match mined {
        Some(block) => {
            println!("mining success.");
            println!("nonce: {}", block.nonce);
            println!("hash: {}", block.hash()?);
            println!("mining time: {:.3} seconds", started.elapsed().as_secs_f64());

            let mut candidate = chain;
            candidate.blocks.push(block);

            let reply = client.submit_chain(&cli.node, &candidate).await?;
            println!("{}", reply);
        }
        None => {
            println!("mining abandoned: a longer chain arrived at the node");
        }
    }

    Ok(())
}
