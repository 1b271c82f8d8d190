use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::domain::{CategoryType, Transaction};

use super::Filter;

/// Transactions debiting or crediting the account.
pub fn by_account(account_id: Uuid) -> Filter<Transaction> {
    Filter::new(move |txn: &Transaction| txn.references(account_id))
}

/// Matches the category recorded on either side when the transaction was built.
pub fn by_category(category_id: Uuid) -> Filter<Transaction> {
    Filter::new(move |txn: &Transaction| {
        txn.debited_category_id == category_id || txn.credited_category_id == category_id
    })
}

pub fn by_category_type(category_type: CategoryType) -> Filter<Transaction> {
    Filter::new(move |txn: &Transaction| {
        txn.debited_type == category_type || txn.credited_type == category_type
    })
}

pub fn by_year(year: i32) -> Filter<Transaction> {
    Filter::new(move |txn: &Transaction| txn.year() == year)
}

pub fn by_month(month: u32, year: i32) -> Filter<Transaction> {
    Filter::new(move |txn: &Transaction| txn.month() == month && txn.year() == year)
}

/// Inclusive date range.
pub fn by_dates(from: NaiveDate, to: NaiveDate) -> Filter<Transaction> {
    Filter::new(move |txn: &Transaction| txn.date >= from && txn.date <= to)
}

pub fn checked() -> Filter<Transaction> {
    Filter::new(|txn: &Transaction| txn.checked)
}

pub fn unchecked() -> Filter<Transaction> {
    Filter::new(|txn: &Transaction| !txn.checked)
}

/// Excludes detail rows of split transactions.
pub fn top_level() -> Filter<Transaction> {
    Filter::new(|txn: &Transaction| txn.parent_id.is_none())
}

pub fn by_contact(contact_id: Uuid) -> Filter<Transaction> {
    Filter::new(move |txn: &Transaction| txn.contact_id == Some(contact_id))
}

/// Case-insensitive substring match on the comment.
pub fn by_comment(fragment: &str) -> Filter<Transaction> {
    let needle = fragment.trim().to_lowercase();
    Filter::new(move |txn: &Transaction| txn.comment.to_lowercase().contains(&needle))
}

pub fn in_year_of(date: NaiveDate) -> Filter<Transaction> {
    by_year(date.year())
}
