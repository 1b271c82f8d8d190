pub mod json_backend;
pub mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Account, Category, Contact, Currency, EntityKind, Icon, Identifiable, Transaction,
};

pub use json_backend::{JsonStorage, STORE_SCHEMA_VERSION};
pub use memory::MemoryStorage;

/// Failure reported by a persistence backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{kind} {id} not found in storage")]
    Missing { kind: EntityKind, id: Uuid },
    #[error("{0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// One persisted entity of any kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Record {
    Icon(Icon),
    Category(Category),
    Currency(Currency),
    Account(Account),
    Contact(Contact),
    Transaction(Transaction),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Icon(_) => EntityKind::Icon,
            Record::Category(_) => EntityKind::Category,
            Record::Currency(_) => EntityKind::Currency,
            Record::Account(_) => EntityKind::Account,
            Record::Contact(_) => EntityKind::Contact,
            Record::Transaction(_) => EntityKind::Transaction,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Record::Icon(value) => value.id(),
            Record::Category(value) => value.id(),
            Record::Currency(value) => value.id(),
            Record::Account(value) => value.id(),
            Record::Contact(value) => value.id(),
            Record::Transaction(value) => value.id(),
        }
    }
}

/// Persistence collaborator the store writes through to.
///
/// Every method either fully applies its change or fails without side
/// effects; the store relies on this to keep its tables in step.
pub trait StorageBackend: Send + Sync {
    /// Returns every persisted record of `kind`.
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>>;
    fn insert(&self, record: &Record) -> Result<()>;
    fn update(&self, record: &Record) -> Result<()>;
    fn delete(&self, kind: EntityKind, id: Uuid) -> Result<()>;
}

/// Applies one mutation to an ordered record list; shared by the bundled backends.
pub(crate) fn apply_insert(records: &mut Vec<Record>, record: &Record) -> Result<()> {
    if position(records, record.kind(), record.id()).is_some() {
        return Err(PersistenceError::Backend(format!(
            "{} {} already stored",
            record.kind(),
            record.id()
        )));
    }
    records.push(record.clone());
    Ok(())
}

pub(crate) fn apply_update(records: &mut [Record], record: &Record) -> Result<()> {
    let idx = position(records, record.kind(), record.id()).ok_or(PersistenceError::Missing {
        kind: record.kind(),
        id: record.id(),
    })?;
    records[idx] = record.clone();
    Ok(())
}

pub(crate) fn apply_delete(records: &mut Vec<Record>, kind: EntityKind, id: Uuid) -> Result<()> {
    let idx = position(records, kind, id).ok_or(PersistenceError::Missing { kind, id })?;
    records.remove(idx);
    Ok(())
}

pub(crate) fn records_of(records: &[Record], kind: EntityKind) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.kind() == kind)
        .cloned()
        .collect()
}

fn position(records: &[Record], kind: EntityKind, id: Uuid) -> Option<usize> {
    records
        .iter()
        .position(|record| record.kind() == kind && record.id() == id)
}
