//! Command-line configuration.

use clap::Parser;
use std::path::PathBuf;

use crate::engine::AccountState;
use crate::model::{Account, Balance};

#[derive(Debug, Parser)]
#[command(name = "coda-bank", version, about = "Single-account bank with a persistent ledger")]
pub struct Args {
    /// Directory holding user.json and transactions.json
    #[arg(long, env = "CODA_BANK_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Number of records shown by `history` without an argument
    #[arg(long, default_value_t = 10)]
    pub history_limit: usize,

    /// Checking balance of a newly created account
    #[arg(long, default_value_t = 1000)]
    pub opening_balance: Balance,

    /// Overdraft limit of a newly created account
    #[arg(long, default_value_t = 100)]
    pub overdraft_limit: u32,

    /// Apply operations from a csv file (`type,amount`) instead of prompting
    #[arg(long, value_name = "FILE", conflicts_with = "export_history")]
    pub batch: Option<PathBuf>,

    /// Write the whole ledger to stdout as csv and exit
    #[arg(long)]
    pub export_history: bool,
}

/// What the binary does once the session is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Batch(PathBuf),
    ExportHistory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub history_limit: usize,
    pub opening_balance: Balance,
    pub overdraft_limit: u32,
    pub mode: Mode,
}

impl Config {
    /// Account created when the data directory holds none.
    pub fn default_account(&self) -> Account {
        Account {
            state: AccountState {
                checking_balance: self.opening_balance,
                overdraft_limit: self.overdraft_limit,
                ..AccountState::default()
            },
            ..Account::default()
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mode = match (args.batch, args.export_history) {
            (Some(path), _) => Mode::Batch(path),
            (None, true) => Mode::ExportHistory,
            (None, false) => Mode::Interactive,
        };
        Self {
            data_dir: args.data_dir,
            history_limit: args.history_limit,
            opening_balance: args.opening_balance,
            overdraft_limit: args.overdraft_limit,
            mode,
        }
    }
}
