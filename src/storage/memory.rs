use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::domain::EntityKind;

use super::{apply_delete, apply_insert, apply_update, records_of, Record, Result, StorageBackend};

/// Keeps records in process memory. Useful as a scratch backend and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: Mutex<Vec<Record>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the backend, e.g. with data a later `preload` should pick up.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().collect()),
        }
    }

    /// Snapshot of everything persisted so far, in write order.
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    pub fn contains(&self, kind: EntityKind, id: Uuid) -> bool {
        self.lock()
            .iter()
            .any(|record| record.kind() == kind && record.id() == id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>> {
        Ok(records_of(&self.lock(), kind))
    }

    fn insert(&self, record: &Record) -> Result<()> {
        apply_insert(&mut self.lock(), record)
    }

    fn update(&self, record: &Record) -> Result<()> {
        apply_update(&mut self.lock(), record)
    }

    fn delete(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        apply_delete(&mut self.lock(), kind, id)
    }
}
