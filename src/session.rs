//! The single banking session.
//!
//! A [`Session`] owns the only mutable copy of the account and the in-memory
//! ledger. Each operation runs the engine against the current state, appends
//! the record, then commits both documents before the next operation starts.
//! `&mut self` on every mutating call is what serializes operations.

use chrono::{DateTime, Utc};
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::engine::{self, AccountState, Rejection};
use crate::ledger::Ledger;
use crate::model::{Account, Operation, TransactionRecord};
use crate::store::{AccountStore, Loaded, StoreError};

/// Counts from [`Session::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: usize,
    pub rejected: usize,
}

pub struct Session<S> {
    store: S,
    account: Account,
    ledger: Ledger,
}

impl<S: AccountStore> Session<S> {
    /// Open a session on `store`, creating the default account on first run.
    pub async fn open(store: S) -> Result<Self, StoreError> {
        Self::open_with(store, Account::default()).await
    }

    /// Open a session on `store`, using `defaults` when no usable account
    /// document exists.
    ///
    /// A missing account document is created immediately. A corrupt one is
    /// left in place until the next successful operation rewrites it.
    pub async fn open_with(mut store: S, defaults: Account) -> Result<Self, StoreError> {
        let account = match store.load_account().await? {
            Loaded::Found(account) => {
                if !account.state.satisfies_invariants() {
                    warn!(
                        balance = account.state.checking_balance,
                        savings = account.state.savings_balance,
                        overdraft_limit = account.state.overdraft_limit,
                        "stored account is outside its limits"
                    );
                }
                account
            }
            Loaded::Missing => {
                info!(id = %defaults.id, "no stored account, creating default");
                store.save_account(&defaults).await?;
                defaults
            }
            Loaded::Corrupt(reason) => {
                warn!(%reason, "stored account is unreadable, using defaults");
                defaults
            }
        };

        let ledger = match store.load_ledger().await? {
            Loaded::Found(records) => Ledger::from(records),
            Loaded::Missing => Ledger::new(),
            Loaded::Corrupt(reason) => {
                warn!(%reason, "stored ledger is unreadable, starting empty");
                Ledger::new()
            }
        };

        info!(
            balance = account.state.checking_balance,
            savings = account.state.savings_balance,
            records = ledger.len(),
            "session opened"
        );

        Ok(Self {
            store,
            account,
            ledger,
        })
    }

    /// Run `op` now and commit the result.
    pub async fn execute(&mut self, op: Operation) -> Result<TransactionRecord, StoreError> {
        self.execute_at(op, Utc::now()).await
    }

    /// Run `op` as of `at` and commit the result.
    ///
    /// The ledger is always written; the account only when the balances
    /// changed. On a write failure the in-memory state and ledger keep the
    /// new values and the error is returned.
    pub async fn execute_at(
        &mut self,
        op: Operation,
        at: DateTime<Utc>,
    ) -> Result<TransactionRecord, StoreError> {
        let applied = engine::apply(&self.account.state, op, at);

        self.account.state = applied.state;
        self.ledger.append(applied.record.clone());

        self.store.save_ledger(self.ledger.records()).await?;
        if applied.is_success() {
            self.store.save_account(&self.account).await?;
        }

        Ok(applied.record)
    }

    pub async fn deposit(&mut self, amount: Amount) -> Result<TransactionRecord, StoreError> {
        self.execute(Operation::Deposit(amount)).await
    }

    pub async fn withdraw(&mut self, amount: Amount) -> Result<TransactionRecord, StoreError> {
        self.execute(Operation::Withdrawal(amount)).await
    }

    pub async fn transfer_to_savings(
        &mut self,
        amount: Amount,
    ) -> Result<TransactionRecord, StoreError> {
        self.execute(Operation::TransferToSavings(amount)).await
    }

    pub async fn transfer_from_savings(
        &mut self,
        amount: Amount,
    ) -> Result<TransactionRecord, StoreError> {
        self.execute(Operation::TransferFromSavings(amount)).await
    }

    /// Run every operation from `stream`, stopping at the first write failure.
    pub async fn run(
        &mut self,
        mut stream: impl Stream<Item = Operation> + Unpin,
    ) -> Result<RunSummary, StoreError> {
        let mut summary = RunSummary::default();
        while let Some(op) = stream.next().await {
            if self.execute(op).await?.is_success() {
                summary.applied += 1;
            } else {
                summary.rejected += 1;
            }
        }
        Ok(summary)
    }
}

impl<S> Session<S> {
    /// Why `op` would be rejected against the current state, if it would be.
    ///
    /// Rejected operations leave the state unchanged, so calling this right
    /// after a rejected [`execute`](Session::execute) explains that record.
    pub fn explain(&self, op: Operation) -> Option<Rejection> {
        engine::check(&self.account.state, op).err()
    }

    pub fn state(&self) -> &AccountState {
        &self.account.state
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The most recent `limit` records, oldest first.
    pub fn history(&self, limit: usize) -> &[TransactionRecord] {
        self.ledger.last_n(limit)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
