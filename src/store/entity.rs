use std::fmt;

use chrono::{DateTime, Utc};

use crate::balance::converted_amount;
use crate::domain::{
    Account, Category, Contact, Currency, EntityKind, Icon, Identifiable, Transaction,
};
use crate::errors::{LedgerError, Result};
use crate::notify::{ChangeBus, ChangeEvent, Topic};
use crate::storage::Record;

use super::table::{Table, Tables};

/// Reference checks run by the store before a mutation reaches the backend.
pub trait Integrity {
    /// Called on insert and update with the tables as they are before the change.
    fn validate(&self, _tables: &Tables) -> Result<()> {
        Ok(())
    }

    /// Called before delete; refusing leaves the entity in place.
    fn check_delete(&self, _tables: &Tables) -> Result<()> {
        Ok(())
    }
}

/// A kind of value the store keeps a table for.
pub trait Entity: Identifiable + Integrity + Clone + Send + Sync + fmt::Debug + 'static {
    const KIND: EntityKind;

    fn table(tables: &Tables) -> &Table<Self>;
    fn table_mut(tables: &mut Tables) -> &mut Table<Self>;
    fn topic(bus: &ChangeBus) -> &Topic<ChangeEvent<Self>>;
    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
    /// Returns the value with its modification stamp set to `at`.
    fn touched(self, at: DateTime<Utc>) -> Self;
}

macro_rules! impl_entity {
    ($ty:ident, $field:ident) => {
        impl Entity for $ty {
            const KIND: EntityKind = EntityKind::$ty;

            fn table(tables: &Tables) -> &Table<Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut Table<Self> {
                &mut tables.$field
            }

            fn topic(bus: &ChangeBus) -> &Topic<ChangeEvent<Self>> {
                &bus.$field
            }

            fn into_record(self) -> Record {
                Record::$ty(self)
            }

            fn from_record(record: Record) -> Option<Self> {
                match record {
                    Record::$ty(value) => Some(value),
                    _ => None,
                }
            }

            fn touched(mut self, at: DateTime<Utc>) -> Self {
                self.modified = at;
                self
            }
        }
    };
}

impl_entity!(Icon, icons);
impl_entity!(Category, categories);
impl_entity!(Currency, currencies);
impl_entity!(Account, accounts);
impl_entity!(Contact, contacts);
impl_entity!(Transaction, transactions);

fn ensure_icon(tables: &Tables, owner: EntityKind, icon: Option<uuid::Uuid>) -> Result<()> {
    match icon {
        Some(id) if !tables.icons.contains(id) => Err(LedgerError::InvalidRef(format!(
            "{} references missing icon {}",
            owner, id
        ))),
        _ => Ok(()),
    }
}

impl Integrity for Icon {
    fn check_delete(&self, tables: &Tables) -> Result<()> {
        let used = tables.categories.iter().any(|c| c.icon_id == Some(self.id))
            || tables.accounts.iter().any(|a| a.icon_id == Some(self.id))
            || tables.contacts.iter().any(|c| c.icon_id == Some(self.id));
        if used {
            return Err(LedgerError::InvalidRef(format!("icon {} is still in use", self.id)));
        }
        Ok(())
    }
}

impl Integrity for Category {
    fn validate(&self, tables: &Tables) -> Result<()> {
        ensure_icon(tables, EntityKind::Category, self.icon_id)
    }

    fn check_delete(&self, tables: &Tables) -> Result<()> {
        let accounts = tables
            .accounts
            .iter()
            .filter(|account| account.category_id == self.id)
            .count();
        if accounts > 0 {
            return Err(LedgerError::InvalidRef(format!(
                "category `{}` is used by {} account(s)",
                self.name, accounts
            )));
        }
        Ok(())
    }
}

impl Integrity for Currency {
    fn check_delete(&self, tables: &Tables) -> Result<()> {
        if tables
            .accounts
            .iter()
            .any(|account| account.currency_id == Some(self.id))
        {
            return Err(LedgerError::InvalidRef(format!(
                "currency {} is used by an account",
                self.symbol
            )));
        }
        Ok(())
    }
}

impl Integrity for Account {
    fn validate(&self, tables: &Tables) -> Result<()> {
        let category = tables.categories.get(self.category_id).ok_or_else(|| {
            LedgerError::InvalidRef(format!(
                "account `{}` references missing category {}",
                self.name, self.category_id
            ))
        })?;
        if category.category_type != self.category_type {
            return Err(LedgerError::Precondition(format!(
                "account `{}` is typed {} but category `{}` is {}",
                self.name,
                self.category_type.label(),
                category.name,
                category.category_type.label()
            )));
        }
        if let Some(currency) = self.currency_id {
            if !tables.currencies.contains(currency) {
                return Err(LedgerError::InvalidRef(format!(
                    "account `{}` references missing currency {}",
                    self.name, currency
                )));
            }
        }
        ensure_icon(tables, EntityKind::Account, self.icon_id)
    }

    fn check_delete(&self, tables: &Tables) -> Result<()> {
        let count = tables
            .transactions
            .iter()
            .filter(|txn| txn.references(self.id))
            .count();
        if count > 0 {
            return Err(LedgerError::AccountInUse { count });
        }
        Ok(())
    }
}

impl Integrity for Contact {
    fn validate(&self, tables: &Tables) -> Result<()> {
        ensure_icon(tables, EntityKind::Contact, self.icon_id)
    }

    fn check_delete(&self, tables: &Tables) -> Result<()> {
        if tables
            .transactions
            .iter()
            .any(|txn| txn.contact_id == Some(self.id))
        {
            return Err(LedgerError::InvalidRef(format!(
                "contact `{}` is referenced by transactions",
                self.name
            )));
        }
        Ok(())
    }
}

impl Integrity for Transaction {
    fn validate(&self, tables: &Tables) -> Result<()> {
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(LedgerError::InvalidAmount(format!(
                "transaction {} has negative amount {}",
                self.id, self.amount
            )));
        }
        for (side, account) in [
            ("debited", self.debited_account_id),
            ("credited", self.credited_account_id),
        ] {
            if !tables.accounts.contains(account) {
                return Err(LedgerError::InvalidRef(format!(
                    "transaction {} references unknown {} account {}",
                    self.id, side, account
                )));
            }
        }
        converted_amount(tables, self).map_err(|_| {
            LedgerError::InvalidAmount(format!(
                "transaction {} amount {} cannot be converted with rate {}",
                self.id, self.amount, self.rate
            ))
        })?;
        if let Some(contact) = self.contact_id {
            if !tables.contacts.contains(contact) {
                return Err(LedgerError::InvalidRef(format!(
                    "transaction {} references missing contact {}",
                    self.id, contact
                )));
            }
        }
        if let Some(parent_id) = self.parent_id {
            if parent_id == self.id {
                return Err(LedgerError::Precondition(format!(
                    "transaction {} cannot be its own parent",
                    self.id
                )));
            }
            if self.detailed {
                return Err(LedgerError::Precondition(format!(
                    "detail transaction {} cannot itself be detailed",
                    self.id
                )));
            }
            let parent = tables.transactions.get(parent_id).ok_or_else(|| {
                LedgerError::InvalidRef(format!(
                    "transaction {} references missing parent {}",
                    self.id, parent_id
                ))
            })?;
            if !parent.detailed {
                return Err(LedgerError::Precondition(format!(
                    "parent transaction {} is not marked detailed",
                    parent_id
                )));
            }
        } else if !self.detailed && has_details(tables, self.id) {
            return Err(LedgerError::Precondition(format!(
                "transaction {} still has detail rows",
                self.id
            )));
        }
        Ok(())
    }

    fn check_delete(&self, tables: &Tables) -> Result<()> {
        if has_details(tables, self.id) {
            return Err(LedgerError::Precondition(format!(
                "transaction {} still has detail rows",
                self.id
            )));
        }
        Ok(())
    }
}

fn has_details(tables: &Tables, parent_id: uuid::Uuid) -> bool {
    tables
        .transactions
        .iter()
        .any(|txn| txn.parent_id == Some(parent_id))
}
