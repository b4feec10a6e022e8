use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{AccountStore, Loaded, StoreError, decode};
use crate::model::{Account, TransactionRecord};

const ACCOUNT_FILE: &str = "user.json";
const LEDGER_FILE: &str = "transactions.json";

/// Stores the account and ledger as pretty-printed JSON files in one
/// directory, created on first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn account_path(&self) -> PathBuf {
        self.dir.join(ACCOUNT_FILE)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }

    async fn read<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<Loaded<T>, StoreError> {
        match fs::read(&path).await {
            Ok(bytes) => Ok(decode(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Loaded::Missing),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    /// Replace `path` with `bytes` via a sibling temp file, so readers never
    /// see a half-written document.
    async fn write(&self, path: PathBuf, bytes: Vec<u8>) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(write_error(&self.dir))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await.map_err(write_error(&tmp))?;
        fs::rename(&tmp, &path).await.map_err(write_error(&path))?;

        debug!(path = %path.display(), bytes = bytes.len(), "document written");
        Ok(())
    }
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + use<> {
    let path = path.to_path_buf();
    move |source| StoreError::Write { path, source }
}

impl AccountStore for JsonFileStore {
    async fn load_account(&self) -> Result<Loaded<Account>, StoreError> {
        Self::read(self.account_path()).await
    }

    async fn save_account(&mut self, account: &Account) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(account)?;
        self.write(self.account_path(), bytes).await
    }

    async fn load_ledger(&self) -> Result<Loaded<Vec<TransactionRecord>>, StoreError> {
        Self::read(self.ledger_path()).await
    }

    async fn save_ledger(&mut self, records: &[TransactionRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        self.write(self.ledger_path(), bytes).await
    }
}
