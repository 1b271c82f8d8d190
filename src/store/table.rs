use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{Account, Category, Contact, Currency, Icon, Identifiable, Transaction};

/// Identifier-keyed table that remembers insertion order.
#[derive(Debug, Clone)]
pub struct Table<E> {
    rows: Vec<E>,
    index: HashMap<Uuid, usize>,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<E: Identifiable> Table<E> {
    pub fn get(&self, id: Uuid) -> Option<&E> {
        self.index.get(&id).map(|&pos| &self.rows[pos])
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.rows.iter()
    }

    pub(crate) fn push(&mut self, row: E) {
        self.index.insert(row.id(), self.rows.len());
        self.rows.push(row);
    }

    /// Replaces the row with the same id in place, returning the previous value.
    pub(crate) fn replace(&mut self, row: E) -> Option<E> {
        let pos = *self.index.get(&row.id())?;
        Some(std::mem::replace(&mut self.rows[pos], row))
    }

    pub(crate) fn remove(&mut self, id: Uuid) -> Option<E> {
        let pos = self.index.remove(&id)?;
        let removed = self.rows.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    /// Inserts or replaces; used when loading rows that may repeat an id.
    pub(crate) fn upsert(&mut self, row: E) {
        if self.contains(row.id()) {
            self.replace(row);
        } else {
            self.push(row);
        }
    }
}

/// Every cached table, guarded together by the store's read/write lock.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub(crate) icons: Table<Icon>,
    pub(crate) categories: Table<Category>,
    pub(crate) currencies: Table<Currency>,
    pub(crate) accounts: Table<Account>,
    pub(crate) contacts: Table<Contact>,
    pub(crate) transactions: Table<Transaction>,
}

impl Tables {
    pub fn icons(&self) -> &Table<Icon> {
        &self.icons
    }

    pub fn categories(&self) -> &Table<Category> {
        &self.categories
    }

    pub fn currencies(&self) -> &Table<Currency> {
        &self.currencies
    }

    pub fn accounts(&self) -> &Table<Account> {
        &self.accounts
    }

    pub fn contacts(&self) -> &Table<Contact> {
        &self.contacts
    }

    pub fn transactions(&self) -> &Table<Transaction> {
        &self.transactions
    }

    /// Dangling references found in loaded data. Preload keeps such rows and
    /// reports them instead of refusing the whole data set.
    pub fn integrity_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for account in self.accounts.iter() {
            match self.categories.get(account.category_id) {
                None => warnings.push(format!(
                    "account {} references missing category {}",
                    account.id, account.category_id
                )),
                Some(category) if category.category_type != account.category_type => {
                    warnings.push(format!(
                        "account {} is typed {} but its category is {}",
                        account.id,
                        account.category_type.label(),
                        category.category_type.label()
                    ))
                }
                Some(_) => {}
            }
            if let Some(currency) = account.currency_id {
                if !self.currencies.contains(currency) {
                    warnings.push(format!(
                        "account {} references missing currency {}",
                        account.id, currency
                    ));
                }
            }
        }

        for txn in self.transactions.iter() {
            if !self.accounts.contains(txn.debited_account_id) {
                warnings.push(format!(
                    "transaction {} references unknown debited account {}",
                    txn.id, txn.debited_account_id
                ));
            }
            if !self.accounts.contains(txn.credited_account_id) {
                warnings.push(format!(
                    "transaction {} references unknown credited account {}",
                    txn.id, txn.credited_account_id
                ));
            }
            if let Some(parent) = txn.parent_id {
                if !self.transactions.contains(parent) {
                    warnings.push(format!(
                        "transaction {} references missing parent {}",
                        txn.id, parent
                    ));
                }
            }
        }
        warnings
    }
}
