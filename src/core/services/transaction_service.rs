//! Business logic helpers for recording transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::domain::account::Account;
use crate::domain::contact::Contact;
use crate::domain::currency::RateDirection;
use crate::domain::transaction::{Transaction, TransactionType};
use crate::errors::Result as LedgerResult;
use crate::store::{Integrity, Store};

/// Editor input for a transaction, before account data is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub date: NaiveDate,
    pub statement_date: Option<NaiveDate>,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub comment: String,
    pub checked: bool,
    pub debited_account_id: Uuid,
    pub credited_account_id: Uuid,
    pub contact_id: Option<Uuid>,
    /// When set, a contact with this name is created and linked instead of `contact_id`.
    pub new_contact_name: Option<String>,
    pub rate: Decimal,
    pub rate_direction: RateDirection,
    pub invoice_number: String,
}

impl TransactionDraft {
    pub fn new(date: NaiveDate, amount: Decimal, debited: Uuid, credited: Uuid) -> Self {
        Self {
            date,
            statement_date: None,
            amount,
            transaction_type: TransactionType::Undefined,
            comment: String::new(),
            checked: false,
            debited_account_id: debited,
            credited_account_id: credited,
            contact_id: None,
            new_contact_name: None,
            rate: Decimal::ONE,
            rate_direction: RateDirection::Multiply,
            invoice_number: String::new(),
        }
    }

    pub fn with_rate(mut self, rate: Decimal, direction: RateDirection) -> Self {
        self.rate = rate;
        self.rate_direction = direction;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_contact(mut self, contact_id: Uuid) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn with_new_contact(mut self, name: impl Into<String>) -> Self {
        self.new_contact_name = Some(name.into());
        self
    }

    pub fn with_statement_date(mut self, statement_date: NaiveDate) -> Self {
        self.statement_date = Some(statement_date);
        self
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// A transaction that passed validation but has not been written yet.
struct Prepared {
    txn: Transaction,
    /// Contact to create right before the transaction is written.
    new_contact: Option<Contact>,
}

/// Provides validated helpers for recording and editing transactions.
pub struct TransactionService;

impl TransactionService {
    /// Records a new top-level transaction.
    pub fn add(store: &Store, draft: TransactionDraft) -> ServiceResult<Transaction> {
        let prepared = Self::prepare(store, draft)?;
        Self::commit(store, prepared, |txn| store.insert(txn))
    }

    /// Rebuilds the transaction `id` from `draft`. Category data is copied
    /// again from the accounts as they are now.
    pub fn update(store: &Store, id: Uuid, draft: TransactionDraft) -> ServiceResult<Transaction> {
        let existing = store
            .get::<Transaction>(id)
            .ok_or_else(|| ServiceError::Invalid("Transaction not found".into()))?;
        let prepared = Self::prepare(store, draft)?;
        Self::commit(store, prepared, |rebuilt| {
            store.update(Transaction {
                id: existing.id,
                parent_id: existing.parent_id,
                detailed: existing.detailed,
                created: existing.created,
                ..rebuilt
            })
        })
    }

    /// Sets the reconciliation flag on every listed transaction. Rows already
    /// in the requested state are left alone. Returns how many changed.
    pub fn check(store: &Store, ids: &[Uuid], checked: bool) -> ServiceResult<usize> {
        let mut changed = 0;
        for id in ids {
            let Some(txn) = store.get::<Transaction>(*id) else {
                return Err(ServiceError::Invalid(format!("Transaction {} not found", id)));
            };
            if txn.checked == checked {
                continue;
            }
            store.update(txn.check(checked))?;
            changed += 1;
        }
        Ok(changed)
    }

    /// Adds a detail row under `parent_id`, marking the parent as detailed.
    /// The parent is only marked once the row itself is known to be valid,
    /// and the mark is withdrawn again if writing the row fails.
    pub fn add_detail(
        store: &Store,
        parent_id: Uuid,
        draft: TransactionDraft,
    ) -> ServiceResult<Transaction> {
        let parent = store
            .get::<Transaction>(parent_id)
            .ok_or_else(|| ServiceError::Invalid("Parent transaction not found".into()))?;
        if parent.is_detail() {
            return Err(ServiceError::Invalid(
                "Detail rows cannot have their own details".into(),
            ));
        }
        let prepared = Self::prepare(store, draft)?;

        let marked = !parent.detailed;
        if marked {
            store.update(parent.clone().as_detailed(true))?;
        }
        let result = Self::commit(store, prepared, |child| {
            store.insert(child.with_parent(parent_id))
        });
        if result.is_err() && marked {
            if let Err(err) = store.update(parent.as_detailed(false)) {
                tracing::warn!(%parent_id, error = %err, "could not unmark parent after failed detail");
            }
        }
        result
    }

    /// Removes a transaction together with its detail rows. If the
    /// transaction itself cannot be removed, its detail rows are put back.
    /// Removing the last detail of a parent clears the parent's detailed flag.
    pub fn remove(store: &Store, id: Uuid) -> ServiceResult<Transaction> {
        let txn = store
            .get::<Transaction>(id)
            .ok_or_else(|| ServiceError::Invalid("Transaction not found".into()))?;

        let mut removed_details = Vec::new();
        for detail in store.transaction_details(id) {
            match store.delete::<Transaction>(detail.id) {
                Ok(removed) => removed_details.push(removed),
                Err(err) => {
                    Self::restore(store, removed_details);
                    return Err(err.into());
                }
            }
        }
        let removed = match store.delete::<Transaction>(id) {
            Ok(removed) => removed,
            Err(err) => {
                Self::restore(store, removed_details);
                return Err(err.into());
            }
        };

        if let Some(parent_id) = txn.parent_id {
            if store.transaction_details(parent_id).is_empty() {
                if let Some(parent) = store.get::<Transaction>(parent_id) {
                    // A detailed parent without rows is still consistent.
                    if let Err(err) = store.update(parent.as_detailed(false)) {
                        tracing::warn!(%parent_id, error = %err, "parent keeps its detailed flag");
                    }
                }
            }
        }
        Ok(removed)
    }

    pub fn list(store: &Store) -> Vec<Transaction> {
        store.all::<Transaction>()
    }

    /// Resolves the draft and validates it as a top-level row without
    /// writing anything.
    fn prepare(store: &Store, draft: TransactionDraft) -> ServiceResult<Prepared> {
        let debited = Self::account(store, draft.debited_account_id, "Debited")?;
        let credited = Self::account(store, draft.credited_account_id, "Credited")?;

        let new_contact = match draft.new_contact_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(Contact::new(name)),
            _ => None,
        };

        let mut txn = Transaction::new(draft.date, draft.amount, &debited, &credited)
            .with_type(draft.transaction_type)
            .with_comment(draft.comment)
            .with_invoice_number(draft.invoice_number)
            .check(draft.checked);
        if debited.currency_id != credited.currency_id {
            txn = txn.with_rate(draft.rate, draft.rate_direction);
        }
        if let Some(statement_date) = draft.statement_date {
            txn = txn.with_statement_date(statement_date);
        }
        if let (None, Some(contact_id)) = (&new_contact, draft.contact_id) {
            txn = txn.with_contact(contact_id);
        }
        store.read(|tables| txn.validate(tables))?;
        Ok(Prepared { txn, new_contact })
    }

    /// Creates the pending contact, then hands the transaction to `write`.
    /// A contact created here is deleted again when `write` fails.
    fn commit<F>(store: &Store, prepared: Prepared, write: F) -> ServiceResult<Transaction>
    where
        F: FnOnce(Transaction) -> LedgerResult<Transaction>,
    {
        let Prepared { mut txn, new_contact } = prepared;
        let created = match new_contact {
            Some(contact) => {
                let contact = store.insert(contact)?;
                txn = txn.with_contact(contact.id);
                Some(contact.id)
            }
            None => None,
        };
        write(txn).map_err(|err| {
            if let Some(contact_id) = created {
                if let Err(undo) = store.delete::<Contact>(contact_id) {
                    tracing::warn!(%contact_id, error = %undo, "could not discard contact");
                }
            }
            err.into()
        })
    }

    fn restore(store: &Store, details: Vec<Transaction>) {
        for detail in details {
            let detail_id = detail.id;
            if let Err(err) = store.insert(detail) {
                tracing::warn!(%detail_id, error = %err, "could not restore detail row");
            }
        }
    }

    fn account(store: &Store, id: Uuid, side: &str) -> ServiceResult<Account> {
        store
            .get::<Account>(id)
            .ok_or_else(|| ServiceError::Invalid(format!("{} account not found", side)))
    }
}
