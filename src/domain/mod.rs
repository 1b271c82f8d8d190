//! Immutable entity values mirrored by the store.

pub mod account;
pub mod category;
pub mod common;
pub mod contact;
pub mod currency;
pub mod icon;
pub mod transaction;

pub use account::{Account, CardType};
pub use category::{Category, CategoryType};
pub use common::{normalize, EntityKind, Identifiable, NamedEntity, Timestamped};
pub use contact::{Contact, ContactType};
pub use currency::{Currency, RateDirection, SymbolPosition};
pub use icon::Icon;
pub use transaction::{Transaction, TransactionType};
