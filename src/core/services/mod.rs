pub mod account_service;
pub mod category_service;
pub mod currency_service;
pub mod transaction_service;

pub use account_service::{AccountService, DeleteOutcome};
pub use category_service::CategoryService;
pub use currency_service::CurrencyService;
pub use transaction_service::{TransactionDraft, TransactionService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}

/// Case-insensitive, whitespace-trimmed comparison used for name uniqueness.
pub(crate) fn same_name(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
