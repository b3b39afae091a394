/// Transaction types for Koban
use crate::canonical;
use crate::crypto::KeyPair;
use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};

/// Sentinel sender for issuance transactions.
pub const REWARD_SENDER: &str = "reward";

/// Sentinel signature carried by reward transactions.
pub const NO_SIGNATURE: &str = "none";

/// A transaction that can occur in a block.
///
/// The two variants are distinguished at the transport boundary: a wire record
/// whose sender is the literal `"reward"` becomes a [`RewardTx`], everything
/// else a [`TransferTx`]. Core logic never re-inspects sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transaction {
    Transfer(TransferTx),
    Reward(RewardTx),
}

/// A signed transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferTx {
    /// Unix milliseconds.
    pub time: u64,
    /// Sender account: compressed secp256k1 public key, hex.
    pub sender: String,
    /// Recipient account: compressed secp256k1 public key, hex.
    pub to: String,
    pub amount: i64,
    /// Compact ECDSA signature over the signing payload, hex.
    pub signature: String,
}

/// An unsigned issuance transaction crediting a miner with the fixed reward.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RewardTx {
    pub time: u64,
    pub to: String,
    pub amount: i64,
}

/// Flat wire record shared by both transaction variants.
///
/// This is also the canonical form: field order is a cross-node compatibility
/// requirement, so do not reorder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TxRecord {
    pub time: u64,
    pub sender: String,
    pub to: String,
    pub amount: i64,
    pub signature: String,
}

/// The portion of a transfer covered by its signature: the wire record with
/// the signature field removed. Field order matters here too.
#[derive(Serialize)]
struct SigningPayload<'a> {
    time: u64,
    sender: &'a str,
    to: &'a str,
    amount: i64,
}

impl TransferTx {
    /// Creates an unsigned transfer stamped with the current time.
    /// Call [`TransferTx::sign`] before submitting it anywhere.
    pub fn new(sender: String, to: String, amount: i64) -> Self {
        TransferTx {
            time: chrono::Utc::now().timestamp_millis() as u64,
            sender,
            to,
            amount,
            signature: String::new(),
        }
    }

    /// Canonical bytes covered by the signature.
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        canonical::to_bytes(&SigningPayload {
            time: self.time,
            sender: &self.sender,
            to: &self.to,
            amount: self.amount,
        })
    }

    /// Signs the transfer with the given keypair. The keypair's public key
    /// must match `sender` or validation will reject the result.
    pub fn sign(&mut self, keypair: &KeyPair) -> Result<()> {
        self.signature = keypair.sign(&self.signing_bytes()?)?;
        Ok(())
    }
}

impl RewardTx {
    pub fn new(to: String, amount: i64) -> Self {
        RewardTx {
            time: chrono::Utc::now().timestamp_millis() as u64,
            to,
            amount,
        }
    }
}

impl Transaction {
    pub fn time(&self) -> u64 {
        match self {
            Transaction::Transfer(tx) => tx.time,
            Transaction::Reward(tx) => tx.time,
        }
    }

    /// The debited account; the virtual `"reward"` account for issuance.
    pub fn sender(&self) -> &str {
        match self {
            Transaction::Transfer(tx) => &tx.sender,
            Transaction::Reward(_) => REWARD_SENDER,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Transaction::Transfer(tx) => &tx.to,
            Transaction::Reward(tx) => &tx.to,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            Transaction::Transfer(tx) => tx.amount,
            Transaction::Reward(tx) => tx.amount,
        }
    }

    pub fn is_reward(&self) -> bool {
        matches!(self, Transaction::Reward(_))
    }

    /// The wire form of this transaction.
    pub fn to_record(&self) -> TxRecord {
        match self {
            Transaction::Transfer(tx) => TxRecord {
                time: tx.time,
                sender: tx.sender.clone(),
                to: tx.to.clone(),
                amount: tx.amount,
                signature: tx.signature.clone(),
            },
            Transaction::Reward(tx) => TxRecord {
                time: tx.time,
                sender: REWARD_SENDER.to_string(),
                to: tx.to.clone(),
                amount: tx.amount,
                signature: NO_SIGNATURE.to_string(),
            },
        }
    }
}

impl TryFrom<TxRecord> for Transaction {
    type Error = ChainError;

    fn try_from(record: TxRecord) -> Result<Self> {
        if record.sender == REWARD_SENDER {
            // A reward record with a real signature is malformed, and letting
            // it through would make two wire-distinct records structurally
            // equal after conversion.
            if record.signature != NO_SIGNATURE {
                return Err(ChainError::Serialization(format!(
                    "Reward transaction must carry the signature sentinel {:?}",
                    NO_SIGNATURE
                )));
            }
            Ok(Transaction::Reward(RewardTx {
                time: record.time,
                to: record.to,
                amount: record.amount,
            }))
        } else {
            Ok(Transaction::Transfer(TransferTx {
                time: record.time,
                sender: record.sender,
                to: record.to,
                amount: record.amount,
                signature: record.signature,
            }))
        }
    }
}

impl Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = TxRecord::deserialize(deserializer)?;
        Transaction::try_from(record).map_err(serde::de::Error::custom)
    }
}
