//! Cryptographic primitives for Koban

use crate::error::{ChainError, Result};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, SECRET_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// A thread-safe, lazily initialized Secp256k1 context.
/// This prevents repeated, unnecessary context creation.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// A secp256k1 keypair. Accounts are identified by the compressed public key,
/// hex-encoded (66 chars).
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair using the OS random number generator.
    pub fn generate() -> Self {
        let secret_key = SecretKey::new(&mut OsRng);
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);

        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from a hex-encoded secret key.
    pub fn from_secret_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ChainError::Crypto(format!("Invalid hex secret key: {}", e)))?;

        let secret_key = SecretKey::from_slice(&bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                ChainError::Crypto(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                ChainError::Crypto(format!("Invalid secret key bytes: {}", e))
            }
        })?;
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);

        Ok(KeyPair {
            secret_key,
            public_key,
        })
    }

    /// The account identifier: compressed public key, hex-encoded.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Signs a payload (hashed with SHA-256 first) and returns the compact
    /// signature, hex-encoded.
    pub fn sign(&self, payload: &[u8]) -> Result<String> {
        let digest = Sha256::digest(payload);

        let message = Message::from_digest_slice(&digest)
            .map_err(|e| ChainError::Crypto(format!("Failed to create message: {}", e)))?;

        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);
        Ok(hex::encode(signature.serialize_compact()))
    }
}

/// Verifies an ECDSA signature over a payload.
///
/// Returns false (never an error) on a malformed key, a malformed signature,
/// or a mismatch: this is the edge adversarial peer input crosses, and it must
/// not be able to crash a validator.
pub fn verify(payload: &[u8], signature_hex: &str, public_key_hex: &str) -> bool {
    let key_bytes = match hex::decode(public_key_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let public_key = match PublicKey::from_slice(&key_bytes) {
        Ok(key) => key,
        Err(_) => return false,
    };

    let sig_bytes = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    if sig_bytes.len() != COMPACT_SIGNATURE_SIZE {
        return false;
    }
    let signature = match Signature::from_compact(&sig_bytes) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let digest = Sha256::digest(payload);
    let message = match Message::from_digest_slice(&digest) {
        Ok(msg) => msg,
        Err(_) => return false,
    };

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, &public_key)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::constants::PUBLIC_KEY_SIZE;

    #[test]
    fn test_key_generation() {
        let keypair = KeyPair::generate();
        // Compressed public key, hex-encoded
        assert_eq!(keypair.public_key_hex().len(), PUBLIC_KEY_SIZE * 2);
        assert_eq!(keypair.secret_key_hex().len(), SECRET_KEY_SIZE * 2);
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let keypair = KeyPair::generate();
        let restored = KeyPair::from_secret_hex(&keypair.secret_key_hex()).unwrap();
        assert_eq!(keypair.public_key_hex(), restored.public_key_hex());
    }

    #[test]
    fn test_signing_and_verification() {
        let keypair = KeyPair::generate();
        let payload = b"Hello, Koban!";

        let signature = keypair.sign(payload).unwrap();
        assert_eq!(signature.len(), COMPACT_SIGNATURE_SIZE * 2);
        assert!(verify(payload, &signature, &keypair.public_key_hex()));
    }

    #[test]
    fn test_wrong_key_fails() {
        let keypair1 = KeyPair::generate();
        let keypair2 = KeyPair::generate();

        let payload = b"Test message";
        let signature = keypair1.sign(payload).unwrap();

        assert!(!verify(payload, &signature, &keypair2.public_key_hex()));
    }

    #[test]
    fn test_tampered_payload_fails() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(b"Original message").unwrap();

        assert!(!verify(
            b"Tampered message",
            &signature,
            &keypair.public_key_hex()
        ));
    }

    #[test]
    fn test_malformed_inputs_return_false() {
        let keypair = KeyPair::generate();
        let signature = keypair.sign(b"Test").unwrap();

        // Not hex at all
        assert!(!verify(b"Test", &signature, "not-hex"));
        assert!(!verify(b"Test", "zz", &keypair.public_key_hex()));
        // Hex but wrong length
        assert!(!verify(b"Test", &signature[2..], &keypair.public_key_hex()));
        assert!(!verify(b"Test", &signature, "abcd"));
        // The reward sentinel is not a key
        assert!(!verify(b"Test", &signature, "reward"));
    }

    #[test]
    fn test_from_secret_hex_invalid() {
        assert!(KeyPair::from_secret_hex("xyz").is_err());
        assert!(KeyPair::from_secret_hex("ab").is_err());
    }
}
