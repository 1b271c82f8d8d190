//! Composable predicates over cached entities.
//!
//! A [`Filter`] is a cheap-to-clone, thread-safe predicate. Builders for each
//! entity kind live in the submodules; they combine with [`Filter::and`],
//! [`Filter::or`], [`Filter::negate`] and [`Filter::all`].

pub mod accounts;
pub mod period;
pub mod transactions;

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Category, CategoryType, Contact};

pub use period::Period;

type Predicate<T> = dyn Fn(&T) -> bool + Send + Sync;

pub struct Filter<T> {
    predicate: Arc<Predicate<T>>,
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter")
    }
}

impl<T: 'static> Filter<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    pub fn always() -> Self {
        Self::new(|_| true)
    }

    pub fn never() -> Self {
        Self::new(|_| false)
    }

    pub fn test(&self, item: &T) -> bool {
        (self.predicate)(item)
    }

    pub fn and(&self, other: &Filter<T>) -> Self {
        let (left, right) = (self.clone(), other.clone());
        Self::new(move |item| left.test(item) && right.test(item))
    }

    pub fn or(&self, other: &Filter<T>) -> Self {
        let (left, right) = (self.clone(), other.clone());
        Self::new(move |item| left.test(item) || right.test(item))
    }

    pub fn negate(&self) -> Self {
        let inner = self.clone();
        Self::new(move |item| !inner.test(item))
    }

    /// Conjunction of `filters`, stopping at the first rejection. An empty
    /// sequence accepts everything.
    pub fn all(filters: impl IntoIterator<Item = Filter<T>>) -> Self {
        let filters: Vec<Filter<T>> = filters.into_iter().collect();
        Self::new(move |item| filters.iter().all(|filter| filter.test(item)))
    }

    /// Disjunction of `filters`. An empty sequence rejects everything.
    pub fn any(filters: impl IntoIterator<Item = Filter<T>>) -> Self {
        let filters: Vec<Filter<T>> = filters.into_iter().collect();
        Self::new(move |item| filters.iter().any(|filter| filter.test(item)))
    }
}

impl<T: 'static> Default for Filter<T> {
    fn default() -> Self {
        Self::always()
    }
}

pub fn category_by_type(category_type: CategoryType) -> Filter<Category> {
    Filter::new(move |category: &Category| category.category_type == category_type)
}

pub fn category_by_id(id: Uuid) -> Filter<Category> {
    Filter::new(move |category: &Category| category.id == id)
}

/// Case-insensitive substring match on the category name.
pub fn category_by_name(fragment: &str) -> Filter<Category> {
    let needle = fragment.trim().to_lowercase();
    Filter::new(move |category: &Category| category.name.to_lowercase().contains(&needle))
}

/// Case-insensitive substring match on the contact name.
pub fn contact_by_name(fragment: &str) -> Filter<Contact> {
    let needle = fragment.trim().to_lowercase();
    Filter::new(move |contact: &Contact| contact.name.to_lowercase().contains(&needle))
}
