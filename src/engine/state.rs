use serde::{Deserialize, Serialize};

use crate::model::Balance;

/// Snapshot of the balances and limits the engine operates on.
///
/// Each successful operation produces a new snapshot; the previous one is
/// never modified. Missing savings fields default to zero so that account
/// files written before savings existed still load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    #[serde(rename = "balance")]
    pub checking_balance: Balance,
    #[serde(default)]
    pub savings_balance: Balance,
    /// Stored only; no operation reads it.
    #[serde(default)]
    pub savings_rate: f64,
    pub overdraft_limit: u32,
}

impl AccountState {
    /// Lowest checking balance allowed by the overdraft limit.
    pub fn floor(&self) -> Balance {
        -Balance::from(self.overdraft_limit)
    }

    pub fn satisfies_invariants(&self) -> bool {
        self.checking_balance >= self.floor() && self.savings_balance >= 0
    }
}

impl Default for AccountState {
    fn default() -> Self {
        Self {
            checking_balance: 1000,
            savings_balance: 0,
            savings_rate: 0.0,
            overdraft_limit: 100,
        }
    }
}
