//! Core domain types shared by the engine, the ledger and the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::Amount;
use crate::engine::AccountState;

/// Balances are whole currency units.
pub type Balance = i64;

/// The four kinds of balance-mutating operations, as named in the ledger file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    SavingsDeposit,
    SavingsWithdrawal,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 4] = [
        TransactionKind::Deposit,
        TransactionKind::Withdrawal,
        TransactionKind::SavingsDeposit,
        TransactionKind::SavingsWithdrawal,
    ];

    /// Look up a kind by its ledger name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::SavingsDeposit => "savings_deposit",
            TransactionKind::SavingsWithdrawal => "savings_withdrawal",
        }
    }

    /// Whether records of this kind carry the savings balance.
    pub fn touches_savings(self) -> bool {
        matches!(
            self,
            TransactionKind::SavingsDeposit | TransactionKind::SavingsWithdrawal
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A request to the engine: what to do and the amount as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Credit the checking balance.
    Deposit(Amount),
    /// Debit the checking balance, down to the overdraft limit.
    Withdrawal(Amount),
    /// Move funds from checking into savings.
    TransferToSavings(Amount),
    /// Move funds from savings back into checking.
    TransferFromSavings(Amount),
}

impl Operation {
    pub fn new(kind: TransactionKind, amount: Amount) -> Self {
        match kind {
            TransactionKind::Deposit => Operation::Deposit(amount),
            TransactionKind::Withdrawal => Operation::Withdrawal(amount),
            TransactionKind::SavingsDeposit => Operation::TransferToSavings(amount),
            TransactionKind::SavingsWithdrawal => Operation::TransferFromSavings(amount),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Operation::Deposit(_) => TransactionKind::Deposit,
            Operation::Withdrawal(_) => TransactionKind::Withdrawal,
            Operation::TransferToSavings(_) => TransactionKind::SavingsDeposit,
            Operation::TransferFromSavings(_) => TransactionKind::SavingsWithdrawal,
        }
    }

    pub fn amount(&self) -> Amount {
        match *self {
            Operation::Deposit(amount)
            | Operation::Withdrawal(amount)
            | Operation::TransferToSavings(amount)
            | Operation::TransferFromSavings(amount) => amount,
        }
    }
}

/// Result of an attempted operation. Persisted as the `success` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Rejected,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

impl From<bool> for Outcome {
    fn from(success: bool) -> Self {
        if success {
            Outcome::Success
        } else {
            Outcome::Rejected
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_success())
    }
}

impl<'de> Deserialize<'de> for Outcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(Outcome::from)
    }
}

/// One ledger entry. Created for every attempt, successful or not, and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Amount,
    pub balance_after: Balance,
    /// Only present for savings kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_balance_after: Option<Balance>,
    #[serde(rename = "success")]
    pub outcome: Outcome,
}

impl TransactionRecord {
    /// Build a record from the state in effect after the operation
    /// (the unchanged state when rejected).
    pub fn new(
        timestamp: DateTime<Utc>,
        kind: TransactionKind,
        amount: Amount,
        after: &AccountState,
        outcome: Outcome,
    ) -> Self {
        Self {
            timestamp,
            kind,
            amount,
            balance_after: after.checking_balance,
            savings_balance_after: kind.touches_savings().then_some(after.savings_balance),
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// The persisted account: identity fields the engine never reads, plus the
/// balances it operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    /// Hashed PIN, opaque here.
    pub pin: String,
    #[serde(flatten)]
    pub state: AccountState,
    #[serde(default)]
    pub failed_attempts: u32,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            id: "1".to_string(),
            pin: String::new(),
            state: AccountState::default(),
            failed_attempts: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap()
    }

    #[test]
    fn operation_kind_and_amount() {
        let amount = Amount::from_whole(10);
        for kind in TransactionKind::ALL {
            let op = Operation::new(kind, amount);
            assert_eq!(op.kind(), kind);
            assert_eq!(op.amount(), amount);
        }
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in TransactionKind::ALL {
            assert_eq!(TransactionKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::from_name("transfer"), None);
    }

    #[test]
    fn record_omits_savings_for_checking_kinds() {
        let state = AccountState::default();
        let record = TransactionRecord::new(
            at(),
            TransactionKind::Deposit,
            Amount::from_whole(5),
            &state,
            Outcome::Success,
        );
        assert_eq!(record.savings_balance_after, None);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "2025-03-14T09:30:00Z",
                "type": "deposit",
                "amount": 5,
                "balanceAfter": 1000,
                "success": true,
            })
        );
    }

    #[test]
    fn record_carries_savings_for_savings_kinds() {
        let state = AccountState {
            savings_balance: 40,
            ..AccountState::default()
        };
        let record = TransactionRecord::new(
            at(),
            TransactionKind::SavingsWithdrawal,
            Amount::from_float(2.5),
            &state,
            Outcome::Rejected,
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "savings_withdrawal");
        assert_eq!(json["amount"], 2.5);
        assert_eq!(json["savingsBalanceAfter"], 40);
        assert_eq!(json["success"], false);
    }

    #[test]
    fn record_reads_millisecond_timestamps() {
        let json = r#"{
            "date": "2024-11-02T18:04:05.123Z",
            "type": "withdrawal",
            "amount": 50,
            "balanceAfter": 950,
            "success": true
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, TransactionKind::Withdrawal);
        assert_eq!(record.amount, Amount::from_whole(50));
        assert_eq!(record.balance_after, 950);
        assert!(record.is_success());
    }

    #[test]
    fn account_file_layout() {
        let account = Account::default();
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "pin": "",
                "balance": 1000,
                "savingsBalance": 0,
                "savingsRate": 0.0,
                "overdraftLimit": 100,
                "failedAttempts": 0,
            })
        );
    }

    #[test]
    fn checking_only_account_file_migrates() {
        let json = r#"{
            "id": "1",
            "pin": "$2b$10$hash",
            "balance": 420,
            "failedAttempts": 2,
            "overdraftLimit": 100
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.pin, "$2b$10$hash");
        assert_eq!(account.failed_attempts, 2);
        assert_eq!(account.state.checking_balance, 420);
        assert_eq!(account.state.savings_balance, 0);
        assert_eq!(account.state.savings_rate, 0.0);
        assert_eq!(account.state.overdraft_limit, 100);
    }
}
