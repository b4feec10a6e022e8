//! Persistence boundary for the account file and the ledger file.
//!
//! Stores only move whole documents in and out. Deciding what a missing or
//! unreadable document means is left to the [`Session`](crate::Session).

use serde::de::DeserializeOwned;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::model::{Account, TransactionRecord};

mod json;
pub use json::JsonFileStore;

mod memory;
pub use memory::MemoryStore;

/// Errors that stop an operation: the document could not be read or written.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of loading a document.
///
/// `Missing` and `Corrupt` are both recoverable; they are kept apart so the
/// caller can tell a first run from a damaged file.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Found(T),
    Missing,
    /// The document exists but could not be parsed; carries the parse error.
    Corrupt(String),
}

impl<T> Loaded<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Loaded::Found(value) => Some(value),
            Loaded::Missing | Loaded::Corrupt(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Loaded::Missing)
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Loaded::Corrupt(_))
    }
}

/// Durable home of the account and its ledger.
///
/// Saves rewrite the whole document. Implementations never retry.
pub trait AccountStore {
    fn load_account(&self) -> impl Future<Output = Result<Loaded<Account>, StoreError>> + Send;

    fn save_account(
        &mut self,
        account: &Account,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn load_ledger(
        &self,
    ) -> impl Future<Output = Result<Loaded<Vec<TransactionRecord>>, StoreError>> + Send;

    fn save_ledger(
        &mut self,
        records: &[TransactionRecord],
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Parse a stored document, turning malformed content into `Loaded::Corrupt`.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Loaded<T> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Loaded::Found(value),
        Err(e) => Loaded::Corrupt(e.to_string()),
    }
}
