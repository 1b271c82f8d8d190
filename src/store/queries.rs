use std::collections::BTreeSet;

use uuid::Uuid;

use crate::domain::{Account, Category, CategoryType, Currency, Transaction};

use super::Store;

/// Read-only lookups used by editors and reports.
impl Store {
    pub fn default_currency(&self) -> Option<Currency> {
        self.read(|tables| tables.currencies.iter().find(|c| c.is_default).cloned())
    }

    /// Categories of any of `types`, in insertion order.
    pub fn categories_by_type(&self, types: &[CategoryType]) -> Vec<Category> {
        self.read(|tables| {
            tables
                .categories
                .iter()
                .filter(|category| types.contains(&category.category_type))
                .cloned()
                .collect()
        })
    }

    pub fn accounts_by_type(&self, category_type: CategoryType) -> Vec<Account> {
        self.read(|tables| {
            tables
                .accounts
                .iter()
                .filter(|account| account.category_type == category_type)
                .cloned()
                .collect()
        })
    }

    pub fn accounts_by_category(&self, category_id: Uuid) -> Vec<Account> {
        self.read(|tables| {
            tables
                .accounts
                .iter()
                .filter(|account| account.category_id == category_id)
                .cloned()
                .collect()
        })
    }

    /// Finds an enabled account by the number printed on a statement. Grouping
    /// spaces are ignored on both sides.
    pub fn account_by_number(&self, number: &str) -> Option<Account> {
        let wanted = number.replace(' ', "");
        if wanted.is_empty() {
            return None;
        }
        self.read(|tables| {
            tables
                .accounts
                .iter()
                .find(|account| account.enabled && account.account_number_no_spaces() == wanted)
                .cloned()
        })
    }

    pub fn transactions_for_account(&self, account_id: Uuid) -> Vec<Transaction> {
        self.transactions_for_accounts(&[account_id])
    }

    pub fn transactions_for_accounts(&self, account_ids: &[Uuid]) -> Vec<Transaction> {
        self.read(|tables| {
            tables
                .transactions
                .iter()
                .filter(|txn| account_ids.iter().any(|id| txn.references(*id)))
                .cloned()
                .collect()
        })
    }

    /// Detail rows of a split transaction.
    pub fn transaction_details(&self, parent_id: Uuid) -> Vec<Transaction> {
        self.read(|tables| {
            tables
                .transactions
                .iter()
                .filter(|txn| txn.parent_id == Some(parent_id))
                .cloned()
                .collect()
        })
    }

    pub fn transactions_in_month(&self, month: u32, year: i32) -> Vec<Transaction> {
        self.read(|tables| {
            tables
                .transactions
                .iter()
                .filter(|txn| txn.month() == month && txn.year() == year)
                .cloned()
                .collect()
        })
    }

    /// Distinct non-empty comments, sorted; feeds comment autocompletion.
    pub fn unique_transaction_comments(&self) -> BTreeSet<String> {
        self.read(|tables| {
            tables
                .transactions
                .iter()
                .filter(|txn| !txn.comment.is_empty())
                .map(|txn| txn.comment.clone())
                .collect()
        })
    }

    /// Number of transactions debiting or crediting the account.
    pub fn transaction_count(&self, account_id: Uuid) -> usize {
        self.read(|tables| {
            tables
                .transactions
                .iter()
                .filter(|txn| txn.references(account_id))
                .count()
        })
    }
}
