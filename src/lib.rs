#![doc(test(attr(deny(warnings))))]

//! Money Core is the in-memory ledger cache behind a personal-finance
//! application: entity tables mirrored from a persistence backend, change
//! notifications, multi-currency balances, and bank-statement reconciliation.

pub mod balance;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod filters;
pub mod notify;
pub mod reconcile;
pub mod storage;
pub mod store;
pub mod utils;

use std::sync::Once;

pub use errors::{LedgerError, Result};
pub use store::Store;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Money Core tracing initialized.");
    });
}
