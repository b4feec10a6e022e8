pub mod amount;
pub mod config;
pub mod csv;
pub mod engine;
pub mod ledger;
pub mod model;
pub mod session;
pub mod shell;
pub mod store;

pub use amount::Amount;
pub use ledger::Ledger;
pub use model::{Account, Operation, TransactionKind, TransactionRecord};
pub use session::Session;
