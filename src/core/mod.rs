//! Validated workflows layered on top of the store.

pub mod services;
