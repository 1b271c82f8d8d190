//! Currency management. The store accepts any number of currencies flagged as
//! default; this service keeps that flag on at most one of them.

use uuid::Uuid;

use crate::domain::currency::Currency;
use crate::store::Store;

use super::{same_name, ServiceError, ServiceResult};

pub struct CurrencyService;

impl CurrencyService {
    pub fn add(store: &Store, currency: Currency) -> ServiceResult<Currency> {
        let duplicate = store.read(|tables| {
            tables
                .currencies()
                .iter()
                .any(|existing| same_name(&existing.symbol, &currency.symbol))
        });
        if duplicate {
            return Err(ServiceError::Invalid(format!(
                "Currency `{}` already exists",
                currency.symbol
            )));
        }
        let make_default = currency.is_default;
        let stored = store.insert(currency.as_default(false))?;
        if make_default {
            return Self::set_default(store, stored.id);
        }
        Ok(stored)
    }

    /// Makes `id` the default currency and clears the flag everywhere else.
    pub fn set_default(store: &Store, id: Uuid) -> ServiceResult<Currency> {
        let target = store
            .get::<Currency>(id)
            .ok_or_else(|| ServiceError::Invalid("Currency not found".into()))?;
        let previous: Vec<Currency> = store
            .all::<Currency>()
            .into_iter()
            .filter(|currency| currency.is_default && currency.id != id)
            .collect();
        for currency in previous {
            store.update(currency.as_default(false))?;
        }
        if target.is_default {
            return Ok(target);
        }
        tracing::info!(symbol = %target.symbol, "default currency changed");
        Ok(store.update(target.as_default(true))?)
    }

    pub fn list(store: &Store) -> Vec<Currency> {
        store.all::<Currency>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn only_one_currency_stays_default() {
        let store = Store::with_backend(MemoryStorage::new());
        let usd = CurrencyService::add(&store, Currency::new("USD").as_default(true)).unwrap();
        let eur = CurrencyService::add(&store, Currency::new("EUR").as_default(true)).unwrap();

        assert!(eur.is_default);
        assert!(!store.get::<Currency>(usd.id).unwrap().is_default);
        assert_eq!(store.default_currency().map(|c| c.id), Some(eur.id));

        CurrencyService::set_default(&store, usd.id).unwrap();
        let defaults: Vec<_> = CurrencyService::list(&store)
            .into_iter()
            .filter(|c| c.is_default)
            .map(|c| c.symbol)
            .collect();
        assert_eq!(defaults, ["USD"]);
    }

    #[test]
    fn duplicate_symbol_is_rejected() {
        let store = Store::with_backend(MemoryStorage::new());
        CurrencyService::add(&store, Currency::new("USD")).unwrap();
        assert!(CurrencyService::add(&store, Currency::new("usd")).is_err());
    }
}
