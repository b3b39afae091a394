#![forbid(unsafe_code)]
//! Keypair generation for Koban accounts

use clap::Parser;
use koban::crypto::KeyPair;

#[derive(Parser)]
#[command(author, version, about = "Generate a secp256k1 keypair", long_about = None)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    let keypair = KeyPair::generate();
    println!("secret key: {}", keypair.secret_key_hex());
    println!("public key: {}", keypair.public_key_hex());
}
