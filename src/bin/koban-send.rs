#![forbid(unsafe_code)]
//! Sign and submit a transfer to a Koban node

use clap::Parser;
use koban::crypto::KeyPair;
use koban::sync::PeerClient;
use koban::transaction::{Transaction, TransferTx};

#[derive(Parser)]
#[command(author, version, about = "Sign and submit a transfer", long_about = None)]
struct Cli {
    /// Node address as host:port
    #[arg(long, default_value = "127.0.0.1:8000")]
    node: String,

    /// Hex-encoded secret key of the sending account
    #[arg(long)]
    secret_key: String,

    /// Recipient public key, hex
    #[arg(long)]
    to: String,

    /// Amount of whole coins to transfer
    #[arg(long)]
    amount: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let keypair = KeyPair::from_secret_hex(&cli.secret_key)?;

    let mut tx = TransferTx::new(keypair.public_key_hex(), cli.to, cli.amount);
    tx.sign(&keypair)?;

    let client = PeerClient::new();
    let reply = client
        .submit_transaction(&cli.node, &Transaction::Transfer(tx))
        .await?;
    println!("{}", reply);

    Ok(())
}
