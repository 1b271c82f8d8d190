use uuid::Uuid;

use crate::domain::category::Category;
use crate::store::Store;

use super::{same_name, ServiceError, ServiceResult};

pub struct CategoryService;

impl CategoryService {
    pub fn add(store: &Store, category: Category) -> ServiceResult<Category> {
        Self::validate_name(store, None, &category)?;
        Ok(store.insert(category)?)
    }

    /// Saves changes to a category. Accounts filed under it pick up a new
    /// category type; recorded transactions keep the type they were built with.
    ///
    /// Retyping a category with a bare `Store::update` leaves its accounts
    /// with the old type: the store then refuses further account writes
    /// until they are refiled, and preload reports them as warnings.
    pub fn edit(store: &Store, changes: Category) -> ServiceResult<Category> {
        let previous = store
            .get::<Category>(changes.id)
            .ok_or_else(|| ServiceError::Invalid("Category not found".into()))?;
        Self::validate_name(store, Some(changes.id), &changes)?;
        let updated = store.update(changes)?;
        if previous.category_type != updated.category_type {
            for account in store.accounts_by_category(updated.id) {
                store.update(account.with_category(&updated))?;
            }
        }
        Ok(updated)
    }

    pub fn remove(store: &Store, id: Uuid) -> ServiceResult<Category> {
        if !store.contains::<Category>(id) {
            return Err(ServiceError::Invalid("Category not found".into()));
        }
        Ok(store.delete::<Category>(id)?)
    }

    fn validate_name(store: &Store, exclude: Option<Uuid>, candidate: &Category) -> ServiceResult<()> {
        let duplicate = store.read(|tables| {
            tables.categories().iter().any(|category| {
                category.category_type == candidate.category_type
                    && same_name(&category.name, &candidate.name)
                    && exclude.map_or(true, |id| category.id != id)
            })
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "Category `{}` already exists",
                candidate.name
            )))
        } else {
            Ok(())
        }
    }
}
