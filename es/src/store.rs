//! Entity store with a degrade-gracefully write policy

use std::path::Path;

use tracing::{debug, error, info};

use crate::backend::{EntityBackend, SqliteBackend};
use crate::entity::{Entity, EntityKey};
use crate::error::StoreError;

/// Result of reading an entity
///
/// A missing key and an unreachable backend are reported separately so
/// callers can choose between proceeding and retrying.
#[derive(Debug)]
pub enum EntityLookup {
    /// The entity exists
    Found(Entity),
    /// No entity is stored under the key
    NotFound,
    /// The backend could not be read
    Unavailable(StoreError),
}

impl EntityLookup {
    /// Check if an entity was found
    pub fn is_found(&self) -> bool {
        matches!(self, EntityLookup::Found(_))
    }

    /// Collapse into an option, treating backend failures as not found
    pub fn into_option(self) -> Option<Entity> {
        match self {
            EntityLookup::Found(entity) => Some(entity),
            EntityLookup::NotFound | EntityLookup::Unavailable(_) => None,
        }
    }
}

/// Store for named entities keyed by (profile_name, entity)
pub struct EntityStore<B = SqliteBackend> {
    backend: B,
    table_name: String,
}

impl EntityStore<SqliteBackend> {
    /// Open a SQLite-backed store and make sure its table exists
    pub fn open(db_path: impl AsRef<Path>, table_prefix: &str) -> Result<Self, StoreError> {
        let store = Self::with_backend(SqliteBackend::new(db_path)?, table_prefix);
        store.ensure_table()?;
        Ok(store)
    }
}

impl<B: EntityBackend> EntityStore<B> {
    /// Wrap a backend without touching it
    pub fn with_backend(backend: B, table_prefix: &str) -> Self {
        let table_name = crate::table_name(table_prefix);
        debug!(%table_name, "EntityStore::with_backend: called");
        Self { backend, table_name }
    }

    /// Name of the backing table
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the table if it does not exist
    ///
    /// Returns true when the table was created. Only a missing table is
    /// tolerated during the existence probe; any other backend error is
    /// returned.
    pub fn ensure_table(&self) -> Result<bool, StoreError> {
        debug!(table = %self.table_name, "ensure_table: called");
        match self.backend.describe_table(&self.table_name) {
            Ok(()) => {
                debug!("ensure_table: table exists");
                Ok(false)
            }
            Err(e) if e.is_not_found() => {
                info!(table = %self.table_name, "Entity table does not exist, creating");
                self.backend.create_table(&self.table_name).inspect_err(|e| {
                    error!(table = %self.table_name, error = %e, "Couldn't create entity table");
                })?;
                Ok(true)
            }
            Err(e) => {
                error!(table = %self.table_name, error = %e, "Couldn't check for existence of entity table");
                Err(e)
            }
        }
    }

    /// Insert or overwrite an entity, logging and dropping any backend error
    ///
    /// Entity bookkeeping must never block the question-answering flow.
    pub fn add(&self, entity: &Entity) {
        if let Err(e) = self.put(entity) {
            error!(key = %entity.key(), error = %e, "Couldn't add entity");
        }
    }

    /// Insert or overwrite an entity, returning backend errors
    pub fn put(&self, entity: &Entity) -> Result<(), StoreError> {
        debug!(key = %entity.key(), "put: called");
        self.backend.put_item(&self.table_name, entity)
    }

    /// Update the four mutable attributes of an entity
    ///
    /// Returns false on backend failure.
    pub fn update_entity(&self, entity: &Entity) -> bool {
        match self.backend.update_item(&self.table_name, entity) {
            Ok(()) => {
                info!(key = %entity.key(), "Updated entity");
                true
            }
            Err(e) => {
                error!(key = %entity.key(), error = %e, "Couldn't update entity");
                false
            }
        }
    }

    /// Read an entity by key
    pub fn get_entity(&self, profile_name: &str, entity: &str) -> EntityLookup {
        let key = EntityKey::new(profile_name, entity);
        match self.backend.get_item(&self.table_name, &key) {
            Ok(Some(found)) => EntityLookup::Found(found),
            Ok(None) => {
                info!(%key, "Entity not found");
                EntityLookup::NotFound
            }
            Err(e) => {
                error!(%key, error = %e, "Couldn't read entity");
                EntityLookup::Unavailable(e)
            }
        }
    }

    /// Delete an entity by key
    ///
    /// Deleting a missing key succeeds. Returns false on backend failure.
    pub fn delete_entity(&self, profile_name: &str, entity: &str) -> bool {
        let key = EntityKey::new(profile_name, entity);
        match self.backend.delete_item(&self.table_name, &key) {
            Ok(()) => {
                info!(%key, "Deleted entity");
                true
            }
            Err(e) => {
                error!(%key, error = %e, "Couldn't delete entity");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that fails every call with a non-"not found" error
    struct BrokenBackend {
        create_calls: AtomicUsize,
    }

    impl BrokenBackend {
        fn new() -> Self {
            Self {
                create_calls: AtomicUsize::new(0),
            }
        }
    }

    fn broken() -> StoreError {
        StoreError::Io(std::io::Error::other("connection reset"))
    }

    impl EntityBackend for BrokenBackend {
        fn describe_table(&self, _table: &str) -> Result<(), StoreError> {
            Err(broken())
        }
        fn create_table(&self, _table: &str) -> Result<(), StoreError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Err(broken())
        }
        fn put_item(&self, _table: &str, _entity: &Entity) -> Result<(), StoreError> {
            Err(broken())
        }
        fn update_item(&self, _table: &str, _entity: &Entity) -> Result<(), StoreError> {
            Err(broken())
        }
        fn get_item(&self, _table: &str, _key: &EntityKey) -> Result<Option<Entity>, StoreError> {
            Err(broken())
        }
        fn delete_item(&self, _table: &str, _key: &EntityKey) -> Result<(), StoreError> {
            Err(broken())
        }
    }

    /// Backend whose table is always missing and whose creation is counted
    struct EmptyBackend {
        create_calls: AtomicUsize,
    }

    impl EntityBackend for EmptyBackend {
        fn describe_table(&self, table: &str) -> Result<(), StoreError> {
            Err(StoreError::TableNotFound {
                table: table.to_string(),
            })
        }
        fn create_table(&self, _table: &str) -> Result<(), StoreError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn put_item(&self, _table: &str, _entity: &Entity) -> Result<(), StoreError> {
            Ok(())
        }
        fn update_item(&self, _table: &str, _entity: &Entity) -> Result<(), StoreError> {
            Ok(())
        }
        fn get_item(&self, _table: &str, _key: &EntityKey) -> Result<Option<Entity>, StoreError> {
            Ok(None)
        }
        fn delete_item(&self, _table: &str, _key: &EntityKey) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_ensure_table_propagates_unexpected_errors() {
        let store = EntityStore::with_backend(BrokenBackend::new(), "");
        let err = store.ensure_table().unwrap_err();
        assert!(!err.is_not_found());
        // The probe failed for a reason other than a missing table, so no create attempt
        assert_eq!(store.backend.create_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ensure_table_creates_missing_table() {
        let store = EntityStore::with_backend(
            EmptyBackend {
                create_calls: AtomicUsize::new(0),
            },
            "dev_",
        );
        assert_eq!(store.table_name(), "dev_NlqEntity");
        assert!(store.ensure_table().unwrap());
        assert_eq!(store.backend.create_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_writes_degrade_gracefully() {
        let store = EntityStore::with_backend(BrokenBackend::new(), "");
        let entity = Entity::new("sales", "希尔顿", "brand", "{}");

        // None of these may panic or propagate
        store.add(&entity);
        assert!(!store.update_entity(&entity));
        assert!(!store.delete_entity("sales", "希尔顿"));
        assert!(store.put(&entity).is_err());
    }

    #[test]
    fn test_get_distinguishes_backend_failure() {
        let store = EntityStore::with_backend(BrokenBackend::new(), "");
        let lookup = store.get_entity("sales", "希尔顿");
        assert!(matches!(lookup, EntityLookup::Unavailable(_)));
        assert!(lookup.into_option().is_none());

        let store = EntityStore::with_backend(
            EmptyBackend {
                create_calls: AtomicUsize::new(0),
            },
            "",
        );
        assert!(matches!(store.get_entity("sales", "希尔顿"), EntityLookup::NotFound));
    }
}
