//! Reasons an operation is rejected.

use thiserror::Error;

use crate::Amount;
use crate::model::{Balance, TransactionKind};

/// Why the engine refused an operation.
///
/// Rejections are recorded in the ledger only as a failed outcome; callers
/// that need the reason obtain it from [`check`](super::check) with the same
/// inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("amount {0} is not a positive whole number")]
    InvalidAmount(Amount),

    #[error(
        "{requested} from a checking balance of {balance} would exceed the overdraft limit of {limit}"
    )]
    ExceedsOverdraft {
        balance: Balance,
        requested: Balance,
        limit: u32,
    },

    #[error("savings balance {savings} is less than the requested {requested}")]
    InsufficientSavings { savings: Balance, requested: Balance },

    #[error("{0} of {1} would overflow the balance")]
    BalanceOverflow(TransactionKind, Balance),
}
