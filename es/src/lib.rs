//! EntityStore - persistence for named entities extracted from user queries
//!
//! An entity is a business term or keyword (a hotel brand, a product line,
//! a region) that an NER step pulled out of a question. Entities are keyed by
//! the owning profile plus the entity text and are overwritten on every new
//! observation.
//!
//! # Architecture
//!
//! ```text
//! EntityStore<B>          write policy (best-effort add/update, strict put)
//!   └── B: EntityBackend  item-level calls against one table
//!         └── SqliteBackend
//!               └── {prefix}NlqEntity (profile_name, entity) -> attributes
//! ```
//!
//! Backend calls are synchronous and blocking. Each call opens its own
//! connection, so a store can be shared across threads without locking.
//!
//! # Example
//!
//! ```ignore
//! use entitystore::{Entity, EntityStore};
//!
//! let store = EntityStore::open("/tmp/entities.db", "dev_")?;
//! store.add(&Entity::new("sales", "希尔顿", "brand", "{\"tables\":[\"orders\"]}"));
//! let hit = store.get_entity("sales", "希尔顿").into_option();
//! ```

mod backend;
mod entity;
mod error;
mod store;

pub use backend::{EntityBackend, SqliteBackend};
pub use entity::{Entity, EntityKey, TIME_FORMAT};
pub use error::StoreError;
pub use store::{EntityLookup, EntityStore};

/// Fixed suffix appended to the configured table prefix
pub const TABLE_SUFFIX: &str = "NlqEntity";

/// Build the full table name for a prefix
pub fn table_name(prefix: &str) -> String {
    format!("{}{}", prefix, TABLE_SUFFIX)
}
