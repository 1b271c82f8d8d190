use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::domain::EntityKind;
use crate::errors::{LedgerError, Result};
use crate::notify::StoreEvent;
use crate::storage::{Record, StorageBackend};

use super::{Store, Tables};

/// Handle to a preload running on a worker thread.
#[derive(Debug)]
pub struct PreloadHandle {
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<()>>,
}

impl PreloadHandle {
    /// Asks the worker to stop before loading the next entity kind.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the worker and returns the preload outcome.
    pub fn join(self) -> Result<()> {
        self.worker
            .join()
            .map_err(|panic| LedgerError::Worker(panic_message(panic.as_ref())))?
    }
}

impl Store {
    /// Replaces every table with the backend's data, loading kinds so that
    /// references always point at rows loaded earlier. Subscribers receive a
    /// single [`StoreEvent::PreloadFinished`] instead of per-row deltas.
    pub fn preload(&self) -> Result<()> {
        self.begin_preload()?;
        self.run_preload(&AtomicBool::new(false))
    }

    /// Starts [`Store::preload`] on a worker thread. The store reports
    /// `is_preloading` from the moment this returns until the worker is done.
    pub fn preload_in_background(self: &Arc<Self>) -> Result<PreloadHandle> {
        self.begin_preload()?;
        let cancel = Arc::new(AtomicBool::new(false));
        let store = Arc::clone(self);
        let flag = Arc::clone(&cancel);
        let spawned = thread::Builder::new()
            .name("money-core-preload".into())
            .spawn(move || store.run_preload(&flag));
        match spawned {
            Ok(worker) => Ok(PreloadHandle { cancel, worker }),
            Err(err) => {
                self.preloading.store(false, Ordering::SeqCst);
                Err(LedgerError::Worker(err.to_string()))
            }
        }
    }

    fn begin_preload(&self) -> Result<()> {
        self.preloading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| LedgerError::Precondition("a preload is already running".into()))
    }

    fn run_preload(&self, cancel: &AtomicBool) -> Result<()> {
        let outcome = {
            let _guard = self.lock_mutation();
            let loaded = load_tables(self.backend().as_ref(), cancel);
            if let Ok(tables) = &loaded {
                for warning in tables.integrity_warnings() {
                    tracing::warn!("{}", warning);
                }
            }
            loaded.map(|tables| {
                let rows = tables.accounts.len() + tables.transactions.len();
                *self.write_tables() = tables;
                rows
            })
        };
        self.preloading.store(false, Ordering::SeqCst);

        match outcome {
            Ok(rows) => {
                tracing::info!(rows, "preload finished");
                self.bus.lifecycle.publish(&StoreEvent::PreloadFinished);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "preload aborted");
                Err(err)
            }
        }
    }
}

fn load_tables(backend: &dyn StorageBackend, cancel: &AtomicBool) -> Result<Tables> {
    let mut tables = Tables::default();
    for kind in EntityKind::PRELOAD_ORDER {
        if cancel.load(Ordering::SeqCst) {
            return Err(LedgerError::Cancelled);
        }
        let records = backend.load_all(kind)?;
        tracing::debug!(%kind, count = records.len(), "loaded");
        for record in records {
            absorb(&mut tables, record);
        }
    }
    Ok(tables)
}

fn absorb(tables: &mut Tables, record: Record) {
    match record {
        Record::Icon(icon) => tables.icons.upsert(icon),
        Record::Category(category) => tables.categories.upsert(category),
        Record::Currency(currency) => tables.currencies.upsert(currency),
        Record::Account(account) => tables.accounts.upsert(account),
        Record::Contact(contact) => tables.contacts.upsert(contact),
        Record::Transaction(txn) => tables.transactions.upsert(txn),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "preload worker panicked".to_string()
    }
}
