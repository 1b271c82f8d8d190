use thiserror::Error;

use crate::storage::PersistenceError;

/// Error type that captures common ledger cache failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A caller broke an operation's contract (duplicate insert, missing
    /// target, mutation while a preload is running). Nothing was changed.
    #[error("Precondition violated: {0}")]
    Precondition(String),
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// An amount or running total left the representable decimal range.
    #[error("Amount out of range: {0}")]
    Overflow(String),
    #[error("Account is referenced by {}", associated_transactions(*count))]
    AccountInUse { count: usize },
    #[error("Preload cancelled")]
    Cancelled,
    #[error("Background worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Renders "1 associated transaction" / "3 associated transactions".
pub fn associated_transactions(count: usize) -> String {
    if count == 1 {
        "1 associated transaction".to_string()
    } else {
        format!("{} associated transactions", count)
    }
}
