use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use uuid::Uuid;

use crate::config::{Config, ConfigManager};
use crate::domain::EntityKind;
use crate::utils::persistence::write_atomic;

use super::{
    apply_delete, apply_insert, apply_update, records_of, PersistenceError, Record, Result,
    StorageBackend,
};

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// On-disk layout: every record of every kind in write order.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreDocument {
    schema_version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    records: Vec<Record>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            schema_version: STORE_SCHEMA_VERSION,
            saved_at: Utc::now(),
            records: Vec::new(),
        }
    }
}

/// File-backed storage that rewrites one JSON document per mutation.
///
/// The document is staged to a sibling temp file and renamed into place, so a
/// failed write leaves the previous version on disk and the in-memory copy
/// unchanged.
#[derive(Debug)]
pub struct JsonStorage {
    path: PathBuf,
    document: Mutex<StoreDocument>,
}

impl JsonStorage {
    /// Opens `path`, starting from an empty document when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let document: StoreDocument = serde_json::from_str(&data)?;
            if document.schema_version > STORE_SCHEMA_VERSION {
                return Err(PersistenceError::Backend(format!(
                    "data file `{}` is from a newer schema version",
                    path.display()
                )));
            }
            document
        } else {
            StoreDocument::default()
        };
        tracing::debug!(path = %path.display(), records = document.records.len(), "opened json storage");
        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    /// Opens the data file named by `config`, relative to the manager's base directory.
    pub fn from_config(manager: &ConfigManager, config: &Config) -> Result<Self> {
        Self::open(manager.data_path(config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, StoreDocument> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `change` to a copy of the document, persists it, then commits it in memory.
    fn mutate<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Record>) -> Result<()>,
    {
        let mut current = self.lock();
        let mut staged = current.clone();
        change(&mut staged.records)?;
        staged.saved_at = Utc::now();
        save_document(&staged, &self.path)?;
        *current = staged;
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>> {
        Ok(records_of(&self.lock().records, kind))
    }

    fn insert(&self, record: &Record) -> Result<()> {
        self.mutate(|records| apply_insert(records, record))
    }

    fn update(&self, record: &Record) -> Result<()> {
        self.mutate(|records| apply_update(records, record))
    }

    fn delete(&self, kind: EntityKind, id: Uuid) -> Result<()> {
        self.mutate(|records| apply_delete(records, kind, id))
    }
}

fn save_document(document: &StoreDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    write_atomic(path, &json)?;
    Ok(())
}
