use std::fmt;

use uuid::Uuid;

use crate::domain::account::Account;
use crate::errors::{associated_transactions, LedgerError};
use crate::store::Store;

use super::{same_name, ServiceError, ServiceResult};

/// Result of an account deletion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Account),
    /// The account is still referenced and was left in place.
    Refused { transactions: usize },
}

impl fmt::Display for DeleteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteOutcome::Deleted(account) => write!(f, "Account `{}` deleted", account.name),
            DeleteOutcome::Refused { transactions } => {
                f.write_str(&associated_transactions(*transactions))
            }
        }
    }
}

pub struct AccountService;

impl AccountService {
    pub fn add(store: &Store, account: Account) -> ServiceResult<Account> {
        Self::validate_name(store, None, &account.name)?;
        Ok(store.insert(account)?)
    }

    pub fn edit(store: &Store, changes: Account) -> ServiceResult<Account> {
        if !store.contains::<Account>(changes.id) {
            return Err(ServiceError::Invalid("Account not found".into()));
        }
        Self::validate_name(store, Some(changes.id), &changes.name)?;
        Ok(store.update(changes)?)
    }

    /// Deletes the account unless transactions still reference it.
    pub fn delete(store: &Store, id: Uuid) -> ServiceResult<DeleteOutcome> {
        if !store.contains::<Account>(id) {
            return Err(ServiceError::Invalid("Account not found".into()));
        }
        let transactions = store.transaction_count(id);
        if transactions > 0 {
            tracing::warn!(%id, transactions, "account deletion refused");
            return Ok(DeleteOutcome::Refused { transactions });
        }
        match store.delete::<Account>(id) {
            Ok(account) => Ok(DeleteOutcome::Deleted(account)),
            Err(LedgerError::AccountInUse { count }) => {
                Ok(DeleteOutcome::Refused { transactions: count })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn set_enabled(store: &Store, id: Uuid, enabled: bool) -> ServiceResult<Account> {
        let account = store
            .get::<Account>(id)
            .ok_or_else(|| ServiceError::Invalid("Account not found".into()))?;
        if account.enabled == enabled {
            return Ok(account);
        }
        Ok(store.update(account.enable(enabled))?)
    }

    pub fn list(store: &Store) -> Vec<Account> {
        store.all::<Account>()
    }

    fn validate_name(store: &Store, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        if candidate.trim().is_empty() {
            return Err(ServiceError::Invalid("Account name is required".into()));
        }
        let duplicate = store.read(|tables| {
            tables.accounts().iter().any(|account| {
                same_name(&account.name, candidate) && exclude.map_or(true, |id| account.id != id)
            })
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "Account `{}` already exists",
                candidate
            )))
        } else {
            Ok(())
        }
    }
}
