use super::{AccountStore, Loaded, StoreError, decode};
use crate::model::{Account, TransactionRecord};

/// In-memory store holding the encoded documents.
///
/// Documents go through the same JSON encoding as [`JsonFileStore`](super::JsonFileStore),
/// so raw contents can be seeded to simulate damaged files. Writes can be made
/// to fail to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    account: Option<String>,
    ledger: Option<String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account_json(mut self, json: impl Into<String>) -> Self {
        self.account = Some(json.into());
        self
    }

    pub fn with_ledger_json(mut self, json: impl Into<String>) -> Self {
        self.ledger = Some(json.into());
        self
    }

    /// Make every subsequent save fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn account_json(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn ledger_json(&self) -> Option<&str> {
        self.ledger.as_deref()
    }

    fn load<T: serde::de::DeserializeOwned>(document: Option<&String>) -> Loaded<T> {
        match document {
            Some(json) => decode(json.as_bytes()),
            None => Loaded::Missing,
        }
    }

    fn check_writable(&self, what: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable(format!("{what} write refused")));
        }
        Ok(())
    }
}

impl AccountStore for MemoryStore {
    async fn load_account(&self) -> Result<Loaded<Account>, StoreError> {
        Ok(Self::load(self.account.as_ref()))
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), StoreError> {
        self.check_writable("account")?;
        self.account = Some(serde_json::to_string_pretty(account)?);
        Ok(())
    }

    async fn load_ledger(&self) -> Result<Loaded<Vec<TransactionRecord>>, StoreError> {
        Ok(Self::load(self.ledger.as_ref()))
    }

    async fn save_ledger(&mut self, records: &[TransactionRecord]) -> Result<(), StoreError> {
        self.check_writable("ledger")?;
        self.ledger = Some(serde_json::to_string_pretty(records)?);
        Ok(())
    }
}
