#![allow(dead_code)]

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use money_core::{
    config::{Config, ConfigManager},
    domain::{Account, Category, CategoryType, EntityKind},
    storage::{JsonStorage, MemoryStorage, PersistenceError, Record, StorageBackend},
    Store,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Store backed by a JSON file in an isolated directory.
pub fn setup_json_store() -> (Arc<Store>, ConfigManager, Config) {
    let manager = ConfigManager::with_base_dir(temp_base()).expect("config manager for temp dir");
    let config = manager.load().expect("default config");
    let storage = JsonStorage::from_config(&manager, &config).expect("json storage backend");
    (Arc::new(Store::with_backend(storage)), manager, config)
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal literal")
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Memory backend whose writes can be switched to fail, wholesale or
/// for one entity kind or record.
#[derive(Debug, Default)]
pub struct FailingStorage {
    inner: MemoryStorage,
    failing: AtomicBool,
    failing_inserts: Mutex<Option<EntityKind>>,
    failing_delete: Mutex<Option<Uuid>>,
}

impl FailingStorage {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fail_inserts_of(&self, kind: Option<EntityKind>) {
        *self.failing_inserts.lock().expect("insert switch") = kind;
    }

    pub fn fail_delete_of(&self, id: Option<Uuid>) {
        *self.failing_delete.lock().expect("delete switch") = id;
    }

    pub fn records(&self) -> Vec<Record> {
        self.inner.records()
    }

    fn guard(&self) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(PersistenceError::Backend("disk full".into()))
        } else {
            Ok(())
        }
    }
}

impl StorageBackend for FailingStorage {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, PersistenceError> {
        self.inner.load_all(kind)
    }

    fn insert(&self, record: &Record) -> Result<(), PersistenceError> {
        self.guard()?;
        if *self.failing_inserts.lock().expect("insert switch") == Some(record.kind()) {
            return Err(PersistenceError::Backend("insert rejected".into()));
        }
        self.inner.insert(record)
    }

    fn update(&self, record: &Record) -> Result<(), PersistenceError> {
        self.guard()?;
        self.inner.update(record)
    }

    fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), PersistenceError> {
        self.guard()?;
        if *self.failing_delete.lock().expect("delete switch") == Some(id) {
            return Err(PersistenceError::Backend("delete rejected".into()));
        }
        self.inner.delete(kind, id)
    }
}

/// Memory backend whose next bulk load waits until the test releases it.
#[derive(Debug, Default)]
pub struct GatedStorage {
    inner: MemoryStorage,
    gate: Mutex<Option<Receiver<()>>>,
}

impl GatedStorage {
    /// Blocks the next `load_all` call until the returned sender fires or is dropped.
    pub fn arm(&self) -> Sender<()> {
        let (release, wait) = mpsc::channel();
        *self.gate.lock().expect("gate lock") = Some(wait);
        release
    }
}

impl StorageBackend for GatedStorage {
    fn load_all(&self, kind: EntityKind) -> Result<Vec<Record>, PersistenceError> {
        let gate = self.gate.lock().expect("gate lock").take();
        if let Some(wait) = gate {
            let _ = wait.recv();
        }
        self.inner.load_all(kind)
    }

    fn insert(&self, record: &Record) -> Result<(), PersistenceError> {
        self.inner.insert(record)
    }

    fn update(&self, record: &Record) -> Result<(), PersistenceError> {
        self.inner.update(record)
    }

    fn delete(&self, kind: EntityKind, id: Uuid) -> Result<(), PersistenceError> {
        self.inner.delete(kind, id)
    }
}

/// A bank category with two accounts, the first opened with 100.00.
pub struct Books {
    pub store: Store,
    pub banks: Category,
    pub a: Account,
    pub b: Account,
}

pub fn books_on(store: Store) -> Books {
    let banks = store
        .insert(Category::new("Banks", CategoryType::BanksAndCash))
        .expect("category");
    let a = store
        .insert(Account::new("A", &banks).with_opening_balance(dec("100.00")))
        .expect("account A");
    let b = store.insert(Account::new("B", &banks)).expect("account B");
    Books { store, banks, a, b }
}

pub fn books() -> Books {
    books_on(Store::with_backend(MemoryStorage::new()))
}
