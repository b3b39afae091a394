//! Canonical serialization and hashing.
//!
//! Every value that gets hashed or signed goes through the same deterministic
//! encoding: serde_json over a typed record, with field order fixed by the
//! struct declaration. Independent nodes must produce byte-identical encodings
//! for the same logical value or cross-node verification breaks, so the wire
//! record layouts in [`crate::transaction`] and [`crate::blockchain`] are a
//! compatibility surface, not an implementation detail.

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Canonical byte encoding of a value.
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

/// SHA-256 over the canonical encoding, as a lowercase hex digest (64 chars).
pub fn hash<T: Serialize>(value: &T) -> Result<String> {
    let bytes = to_bytes(value)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
