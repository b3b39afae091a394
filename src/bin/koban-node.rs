#![forbid(unsafe_code)]
//! Node entry point for Koban

use clap::Parser;
use koban::config::load_config;
use koban::node::Node;

#[derive(Parser)]
#[command(author, version, about = "Run a Koban ledger node", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let node = Node::init(config)?;
    node.start().await?;

    Ok(())
}
