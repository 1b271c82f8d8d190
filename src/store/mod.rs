//! The in-memory ledger cache.
//!
//! A [`Store`] keeps one table per entity kind and writes every mutation
//! through to its [`StorageBackend`] before touching the tables. Subscribers
//! learn about committed changes through the [`ChangeBus`].

pub mod entity;
pub mod preload;
pub mod queries;
pub mod table;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::filters::Filter;
use crate::notify::{ChangeBus, ChangeEvent, StoreEvent, Subscription};
use crate::storage::StorageBackend;

pub use entity::{Entity, Integrity};
pub use preload::PreloadHandle;
pub use table::{Table, Tables};

pub struct Store {
    tables: RwLock<Tables>,
    mutation: Mutex<()>,
    preloading: AtomicBool,
    backend: RwLock<Arc<dyn StorageBackend>>,
    bus: ChangeBus,
}

impl Store {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            mutation: Mutex::new(()),
            preloading: AtomicBool::new(false),
            backend: RwLock::new(backend),
            bus: ChangeBus::new(),
        }
    }

    pub fn with_backend(backend: impl StorageBackend + 'static) -> Self {
        Self::new(Arc::new(backend))
    }

    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.backend.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }

    pub fn is_preloading(&self) -> bool {
        self.preloading.load(Ordering::SeqCst)
    }

    /// Runs `f` against one consistent snapshot of every table.
    pub fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&self.read_tables())
    }

    pub fn get<E: Entity>(&self, id: Uuid) -> Option<E> {
        E::table(&self.read_tables()).get(id).cloned()
    }

    pub fn contains<E: Entity>(&self, id: Uuid) -> bool {
        E::table(&self.read_tables()).contains(id)
    }

    /// Entities of kind `E` accepted by `filter`, in insertion order.
    pub fn get_all<E: Entity>(&self, filter: &Filter<E>) -> Vec<E> {
        E::table(&self.read_tables())
            .iter()
            .filter(|entity| filter.test(entity))
            .cloned()
            .collect()
    }

    pub fn all<E: Entity>(&self) -> Vec<E> {
        E::table(&self.read_tables()).iter().cloned().collect()
    }

    pub fn len<E: Entity>(&self) -> usize {
        E::table(&self.read_tables()).len()
    }

    /// Adds a new entity. The backend is written first; the table and
    /// subscribers only see the entity once the write succeeded.
    pub fn insert<E: Entity>(&self, entity: E) -> Result<E> {
        let event = {
            let _guard = self.begin_mutation()?;
            {
                let tables = self.read_tables();
                if E::table(&tables).contains(entity.id()) {
                    return Err(LedgerError::Precondition(format!(
                        "{} {} is already stored",
                        E::KIND,
                        entity.id()
                    )));
                }
                entity.validate(&tables)?;
            }
            self.write_through(|backend| backend.insert(&entity.clone().into_record()))?;
            E::table_mut(&mut self.write_tables()).push(entity.clone());
            ChangeEvent::Added(entity.clone())
        };
        tracing::debug!(kind = %E::KIND, id = %entity.id(), "inserted");
        E::topic(&self.bus).publish(&event);
        Ok(entity)
    }

    /// Replaces the stored value with the same id, keeping its position, and
    /// stamps its modification time.
    pub fn update<E: Entity>(&self, entity: E) -> Result<E> {
        let entity = entity.touched(Utc::now());
        let event = {
            let _guard = self.begin_mutation()?;
            {
                let tables = self.read_tables();
                if !E::table(&tables).contains(entity.id()) {
                    return Err(missing::<E>(entity.id()));
                }
                entity.validate(&tables)?;
            }
            self.write_through(|backend| backend.update(&entity.clone().into_record()))?;
            let old = E::table_mut(&mut self.write_tables())
                .replace(entity.clone())
                .ok_or_else(|| missing::<E>(entity.id()))?;
            ChangeEvent::Updated {
                old,
                new: entity.clone(),
            }
        };
        tracing::debug!(kind = %E::KIND, id = %entity.id(), "updated");
        E::topic(&self.bus).publish(&event);
        Ok(entity)
    }

    /// Removes the entity with `id` and returns its last value.
    pub fn delete<E: Entity>(&self, id: Uuid) -> Result<E> {
        let removed = {
            let _guard = self.begin_mutation()?;
            {
                let tables = self.read_tables();
                let existing = E::table(&tables).get(id).ok_or_else(|| missing::<E>(id))?;
                if let Err(err) = existing.check_delete(&tables) {
                    tracing::warn!(kind = %E::KIND, %id, error = %err, "delete refused");
                    return Err(err);
                }
            }
            self.write_through(|backend| backend.delete(E::KIND, id))?;
            E::table_mut(&mut self.write_tables())
                .remove(id)
                .ok_or_else(|| missing::<E>(id))?
        };
        tracing::debug!(kind = %E::KIND, %id, "deleted");
        E::topic(&self.bus).publish(&ChangeEvent::Removed(removed.clone()));
        Ok(removed)
    }

    /// Empties every table and switches to `backend`, e.g. after the data
    /// source was reinitialized.
    pub fn reset(&self, backend: Arc<dyn StorageBackend>) -> Result<()> {
        {
            let _guard = self.begin_mutation()?;
            *self.backend.write().unwrap_or_else(PoisonError::into_inner) = backend;
            *self.write_tables() = Tables::default();
        }
        tracing::info!("store cleared");
        self.bus.lifecycle.publish(&StoreEvent::Cleared);
        Ok(())
    }

    /// Calls `callback` with every committed delta of kind `E` until the
    /// returned guard is dropped. The callback runs on the mutating thread
    /// after the store locks are released, so it may read the store; slow
    /// consumers belong on [`Store::subscribe_channel`].
    pub fn subscribe<E, F>(&self, callback: F) -> Subscription
    where
        E: Entity,
        F: Fn(&ChangeEvent<E>) + Send + Sync + 'static,
    {
        E::topic(&self.bus).subscribe(callback)
    }

    pub fn subscribe_channel<E: Entity>(&self) -> Receiver<ChangeEvent<E>> {
        E::topic(&self.bus).subscribe_channel()
    }

    /// Live subscribers for kind `E`, after pruning dropped ones.
    pub fn subscriber_count<E: Entity>(&self) -> usize {
        E::topic(&self.bus).subscriber_count()
    }

    pub fn subscribe_lifecycle<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.bus.lifecycle.subscribe(callback)
    }

    pub fn lifecycle_channel(&self) -> Receiver<StoreEvent> {
        self.bus.lifecycle.subscribe_channel()
    }

    pub(crate) fn read_tables(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write_tables(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lock_mutation(&self) -> MutexGuard<'_, ()> {
        self.mutation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_mutation(&self) -> Result<MutexGuard<'_, ()>> {
        self.ensure_not_preloading()?;
        let guard = self.lock_mutation();
        self.ensure_not_preloading()?;
        Ok(guard)
    }

    fn ensure_not_preloading(&self) -> Result<()> {
        if self.is_preloading() {
            return Err(LedgerError::Precondition(
                "store is preloading; mutations are not allowed".into(),
            ));
        }
        Ok(())
    }

    fn write_through<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&dyn StorageBackend) -> crate::storage::Result<()>,
    {
        let backend = self.backend();
        write(backend.as_ref()).map_err(|err| {
            tracing::warn!(error = %err, "backend write failed");
            LedgerError::from(err)
        })
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.read_tables();
        f.debug_struct("Store")
            .field("accounts", &tables.accounts.len())
            .field("transactions", &tables.transactions.len())
            .field("preloading", &self.is_preloading())
            .finish()
    }
}

fn missing<E: Entity>(id: Uuid) -> LedgerError {
    LedgerError::Precondition(format!("{} {} is not stored", E::KIND, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, Category, CategoryType, Transaction};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::atomic::AtomicUsize;

    fn store() -> (Arc<MemoryStorage>, Store) {
        let backend = Arc::new(MemoryStorage::new());
        let store = Store::new(backend.clone());
        (backend, store)
    }

    #[test]
    fn insert_writes_through_and_publishes() {
        let (backend, store) = store();
        let events = store.subscribe_channel::<Category>();
        let category = store
            .insert(Category::new("Banks", CategoryType::BanksAndCash))
            .unwrap();

        assert!(backend.contains(crate::domain::EntityKind::Category, category.id));
        assert_eq!(store.get::<Category>(category.id), Some(category.clone()));
        assert_eq!(events.try_recv(), Ok(ChangeEvent::Added(category)));
    }

    #[test]
    fn duplicate_insert_is_a_precondition_violation() {
        let (_backend, store) = store();
        let category = store
            .insert(Category::new("Banks", CategoryType::BanksAndCash))
            .unwrap();
        let err = store.insert(category).unwrap_err();
        assert!(matches!(err, LedgerError::Precondition(_)));
        assert_eq!(store.len::<Category>(), 1);
    }

    #[test]
    fn update_keeps_position_and_reports_old_value() {
        let (_backend, store) = store();
        let first = store
            .insert(Category::new("First", CategoryType::Incomes))
            .unwrap();
        store
            .insert(Category::new("Second", CategoryType::Incomes))
            .unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let old_name = first.name.clone();
        let _sub = store.subscribe::<Category, _>(move |event| {
            if let ChangeEvent::Updated { old, new } = event {
                assert_eq!(old.name, old_name);
                assert_eq!(new.name, "Renamed");
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let renamed = Category {
            name: "Renamed".into(),
            ..first
        };
        let stored = store.update(renamed).unwrap();
        assert!(stored.modified >= stored.created);
        let names: Vec<_> = store
            .all::<Category>()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Renamed", "Second"]);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_targets_are_rejected() {
        let (_backend, store) = store();
        let ghost = Category::new("Ghost", CategoryType::Assets);
        assert!(matches!(
            store.update(ghost.clone()),
            Err(LedgerError::Precondition(_))
        ));
        assert!(matches!(
            store.delete::<Category>(ghost.id),
            Err(LedgerError::Precondition(_))
        ));
    }

    #[test]
    fn dangling_account_category_is_an_invalid_reference() {
        let (backend, store) = store();
        let category = Category::new("Banks", CategoryType::BanksAndCash);
        let account = Account::new("Cash", &category);
        assert!(matches!(
            store.insert(account),
            Err(LedgerError::InvalidRef(_))
        ));
        assert!(backend.records().is_empty());
    }

    #[test]
    fn referenced_account_delete_is_refused() {
        let (_backend, store) = store();
        let banks = store
            .insert(Category::new("Banks", CategoryType::BanksAndCash))
            .unwrap();
        let a = store.insert(Account::new("A", &banks)).unwrap();
        let b = store.insert(Account::new("B", &banks)).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        store
            .insert(Transaction::new(date, Decimal::TEN, &a, &b))
            .unwrap();

        let err = store.delete::<Account>(a.id).unwrap_err();
        assert!(err.to_string().contains("1 associated transaction"));
        assert!(store.contains::<Account>(a.id));
    }

    #[test]
    fn reset_clears_tables_and_announces_it() {
        let (_backend, store) = store();
        store
            .insert(Category::new("Banks", CategoryType::BanksAndCash))
            .unwrap();
        let lifecycle = store.lifecycle_channel();

        store.reset(Arc::new(MemoryStorage::new())).unwrap();
        assert_eq!(store.len::<Category>(), 0);
        assert_eq!(lifecycle.try_recv(), Ok(StoreEvent::Cleared));
    }
}
