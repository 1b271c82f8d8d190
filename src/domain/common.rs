use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Creation and modification stamps carried by every cached record.
pub trait Timestamped {
    fn created(&self) -> DateTime<Utc>;
    fn modified(&self) -> DateTime<Utc>;
}

/// The entity kinds held by the store, one table each.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Icon,
    Category,
    Currency,
    Account,
    Contact,
    Transaction,
}

impl EntityKind {
    /// Bulk loading order: every kind only references kinds loaded before it.
    pub const PRELOAD_ORDER: [EntityKind; 6] = [
        EntityKind::Icon,
        EntityKind::Category,
        EntityKind::Currency,
        EntityKind::Account,
        EntityKind::Contact,
        EntityKind::Transaction,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Icon => "icon",
            EntityKind::Category => "category",
            EntityKind::Currency => "currency",
            EntityKind::Account => "account",
            EntityKind::Contact => "contact",
            EntityKind::Transaction => "transaction",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trims free-form text fields the way editors hand them over.
pub fn normalize(value: impl Into<String>) -> String {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use rust_decimal;
pub use serde;
pub use uuid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preload_order_starts_with_icons_and_ends_with_transactions() {
        assert_eq!(EntityKind::PRELOAD_ORDER.first(), Some(&EntityKind::Icon));
        assert_eq!(
            EntityKind::PRELOAD_ORDER.last(),
            Some(&EntityKind::Transaction)
        );
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize("  groceries "), "groceries");
        assert_eq!(normalize("rent"), "rent");
    }
}
