mod common;

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{date, dec, setup_json_store, FailingStorage, GatedStorage};
use money_core::{
    domain::{Account, Category, CategoryType, Transaction},
    notify::{ChangeEvent, StoreEvent},
    storage::JsonStorage,
    LedgerError, Store,
};

#[test]
fn backend_failure_leaves_store_and_subscribers_untouched() {
    let backend = Arc::new(FailingStorage::default());
    let store = Store::new(backend.clone());
    let banks = store
        .insert(Category::new("Banks", CategoryType::BanksAndCash))
        .unwrap();
    let deltas = store.subscribe_channel::<Category>();

    backend.set_failing(true);
    let err = store
        .insert(Category::new("Food", CategoryType::Expenses))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Persistence(_)));

    let renamed = Category {
        name: "Cash".into(),
        ..banks.clone()
    };
    assert!(store.update(renamed).is_err());
    assert!(store.delete::<Category>(banks.id).is_err());

    assert_eq!(store.all::<Category>(), vec![banks]);
    assert!(deltas.try_recv().is_err());
    assert_eq!(backend.records().len(), 1);
}

#[test]
fn json_write_failure_keeps_previous_file_and_cache() {
    let (store, manager, config) = setup_json_store();
    let banks = store
        .insert(Category::new("Banks", CategoryType::BanksAndCash))
        .unwrap();
    let path = manager.data_path(&config);
    let original = fs::read_to_string(&path).expect("data file written");

    // A directory at the temp path makes the staged write fail.
    fs::create_dir_all(path.with_extension("json.tmp")).unwrap();
    let err = store
        .insert(Category::new("Food", CategoryType::Expenses))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Persistence(_)));

    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert_eq!(store.all::<Category>(), vec![banks]);
}

#[test]
fn dropped_subscriber_is_never_called_again() {
    let store = Store::with_backend(money_core::storage::MemoryStorage::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let subscription = store.subscribe::<Category, _>(move |event| {
        assert!(matches!(event, ChangeEvent::Added(_)));
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store
        .insert(Category::new("Banks", CategoryType::BanksAndCash))
        .unwrap();
    subscription.unsubscribe();
    store
        .insert(Category::new("Food", CategoryType::Expenses))
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.subscriber_count::<Category>(), 0);
}

#[test]
fn preload_restores_everything_from_json() {
    let (store, manager, config) = setup_json_store();
    let banks = store
        .insert(Category::new("Banks", CategoryType::BanksAndCash))
        .unwrap();
    let a = store.insert(Account::new("A", &banks)).unwrap();
    let b = store.insert(Account::new("B", &banks)).unwrap();
    let txn = store
        .insert(Transaction::new(date(2024, 2, 1), dec("12.50"), &a, &b))
        .unwrap();

    let reopened = Store::with_backend(JsonStorage::from_config(&manager, &config).unwrap());
    let lifecycle = reopened.lifecycle_channel();
    reopened.preload().unwrap();

    assert_eq!(reopened.get::<Transaction>(txn.id), Some(txn));
    assert_eq!(reopened.all::<Account>(), vec![a, b]);
    assert_eq!(lifecycle.try_recv(), Ok(StoreEvent::PreloadFinished));
}

#[test]
fn cancelled_background_preload_keeps_current_tables() {
    let backend = Arc::new(GatedStorage::default());
    let store = Arc::new(Store::new(backend.clone()));
    let banks = store
        .insert(Category::new("Banks", CategoryType::BanksAndCash))
        .unwrap();

    let release = backend.arm();
    let handle = store.preload_in_background().unwrap();
    assert!(store.is_preloading());
    assert!(matches!(
        store.insert(Category::new("Food", CategoryType::Expenses)),
        Err(LedgerError::Precondition(_))
    ));

    handle.cancel();
    release.send(()).unwrap();
    assert!(matches!(handle.join(), Err(LedgerError::Cancelled)));

    assert!(!store.is_preloading());
    assert_eq!(store.all::<Category>(), vec![banks]);
}
