//! Transaction engine.
//!
//! Pure functions from the current [`AccountState`] and a requested
//! [`Operation`] to the next state plus the ledger record describing the
//! attempt. A rejected operation is a normal outcome: the state comes back
//! unchanged and a failed record is still produced.
//!
//! The engine performs no I/O. Committing the returned state and appending
//! the record is up to the caller (see [`Session`](crate::Session)).

use chrono::{DateTime, Utc};
use tracing::info;

use crate::Amount;
use crate::model::{Balance, Operation, Outcome, TransactionKind, TransactionRecord};

mod state;
pub use state::AccountState;

mod error;
pub use error::Rejection;

/// What an operation produced: the record to append and the state to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub record: TransactionRecord,
    pub state: AccountState,
}

impl Applied {
    pub fn is_success(&self) -> bool {
        self.record.is_success()
    }
}

/// Apply an operation on top of `state`, evaluated at `at`.
pub fn apply(state: &AccountState, op: Operation, at: DateTime<Utc>) -> Applied {
    let result = check(state, op);
    log_result(op, state, &result);

    let (next, outcome) = match result {
        Ok(next) => (next, Outcome::Success),
        Err(_) => (*state, Outcome::Rejected),
    };

    Applied {
        record: TransactionRecord::new(at, op.kind(), op.amount(), &next, outcome),
        state: next,
    }
}

/// Credit `amount` to the checking balance.
pub fn deposit(state: &AccountState, amount: Amount, at: DateTime<Utc>) -> Applied {
    apply(state, Operation::Deposit(amount), at)
}

/// Debit `amount` from the checking balance, down to the overdraft limit.
pub fn withdraw(state: &AccountState, amount: Amount, at: DateTime<Utc>) -> Applied {
    apply(state, Operation::Withdrawal(amount), at)
}

/// Move `amount` from checking to savings. Checking may go into overdraft.
pub fn transfer_to_savings(state: &AccountState, amount: Amount, at: DateTime<Utc>) -> Applied {
    apply(state, Operation::TransferToSavings(amount), at)
}

/// Move `amount` from savings back to checking.
pub fn transfer_from_savings(state: &AccountState, amount: Amount, at: DateTime<Utc>) -> Applied {
    apply(state, Operation::TransferFromSavings(amount), at)
}

/// Validate `op` against `state` and compute the candidate next state.
///
/// This is the single source of truth for acceptance: [`apply`] commits
/// exactly what this returns, so callers can re-run it to explain a
/// rejected record.
pub fn check(state: &AccountState, op: Operation) -> Result<AccountState, Rejection> {
    let amount = validate_amount(op.amount())?;

    match op {
        Operation::Deposit(_) => Ok(AccountState {
            checking_balance: credit(state.checking_balance, amount, op.kind())?,
            ..*state
        }),
        Operation::Withdrawal(_) => Ok(AccountState {
            checking_balance: debit_checking(state, amount, op.kind())?,
            ..*state
        }),
        Operation::TransferToSavings(_) => Ok(AccountState {
            checking_balance: debit_checking(state, amount, op.kind())?,
            savings_balance: credit(state.savings_balance, amount, op.kind())?,
            ..*state
        }),
        Operation::TransferFromSavings(_) => {
            if amount > state.savings_balance {
                return Err(Rejection::InsufficientSavings {
                    savings: state.savings_balance,
                    requested: amount,
                });
            }
            Ok(AccountState {
                checking_balance: credit(state.checking_balance, amount, op.kind())?,
                savings_balance: state.savings_balance - amount,
                ..*state
            })
        }
    }
}

/// Every operation requires a positive whole amount.
fn validate_amount(amount: Amount) -> Result<Balance, Rejection> {
    if !amount.is_positive() {
        return Err(Rejection::InvalidAmount(amount));
    }
    amount.whole().ok_or(Rejection::InvalidAmount(amount))
}

fn credit(balance: Balance, amount: Balance, kind: TransactionKind) -> Result<Balance, Rejection> {
    balance
        .checked_add(amount)
        .ok_or(Rejection::BalanceOverflow(kind, amount))
}

/// Debit checking, refusing anything that lands below the overdraft floor.
fn debit_checking(
    state: &AccountState,
    amount: Balance,
    kind: TransactionKind,
) -> Result<Balance, Rejection> {
    let next = state
        .checking_balance
        .checked_sub(amount)
        .ok_or(Rejection::BalanceOverflow(kind, amount))?;

    if next < state.floor() {
        return Err(Rejection::ExceedsOverdraft {
            balance: state.checking_balance,
            requested: amount,
            limit: state.overdraft_limit,
        });
    }
    Ok(next)
}

/// Small helper to log `apply` results
fn log_result(op: Operation, before: &AccountState, result: &Result<AccountState, Rejection>) {
    match result {
        Ok(next) => {
            info!(
                kind = %op.kind(),
                amount = %op.amount(),
                balance = next.checking_balance,
                savings = next.savings_balance,
                "operation applied"
            );
        }
        Err(reason) => {
            info!(
                kind = %op.kind(),
                amount = %op.amount(),
                balance = before.checking_balance,
                savings = before.savings_balance,
                reason = %reason,
                "operation rejected"
            );
        }
    }
}
