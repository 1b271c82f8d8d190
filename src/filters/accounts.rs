use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Account, CategoryType};

use super::Filter;

pub fn by_id(id: Uuid) -> Filter<Account> {
    Filter::new(move |account: &Account| account.id == id)
}

pub fn by_category(category_id: Uuid) -> Filter<Account> {
    Filter::new(move |account: &Account| account.category_id == category_id)
}

pub fn by_category_type(category_type: CategoryType) -> Filter<Account> {
    Filter::new(move |account: &Account| account.category_type == category_type)
}

/// Case-insensitive substring match on the account name.
pub fn by_name(fragment: &str) -> Filter<Account> {
    let needle = fragment.trim().to_lowercase();
    Filter::new(move |account: &Account| account.name.to_lowercase().contains(&needle))
}

pub fn enabled() -> Filter<Account> {
    Filter::new(|account: &Account| account.enabled)
}

/// Accounts whose closing date, if any, is still ahead of `date`.
pub fn open_on(date: NaiveDate) -> Filter<Account> {
    Filter::new(move |account: &Account| account.is_open_on(date))
}
