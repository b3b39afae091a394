// Thin re-export module: types and validation live in `transaction/` so the
// wire model and the soundness checks can evolve separately.

pub mod types;
pub mod validation;

pub use types::{RewardTx, Transaction, TransferTx, TxRecord, NO_SIGNATURE, REWARD_SENDER};
pub use validation::{is_duplicate, validate_tx};
