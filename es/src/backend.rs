//! Item-level persistence backends

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use crate::entity::{Entity, EntityKey};
use crate::error::StoreError;

/// Item-level operations against a single entity table
///
/// Implementations perform blocking calls. `describe_table` must report a
/// missing table as [`StoreError::TableNotFound`] so callers can tell it apart
/// from communication failures.
pub trait EntityBackend: Send + Sync {
    /// Probe a table, failing with `TableNotFound` if it does not exist
    fn describe_table(&self, table: &str) -> Result<(), StoreError>;

    /// Create a table keyed by (profile_name, entity)
    fn create_table(&self, table: &str) -> Result<(), StoreError>;

    /// Insert or overwrite a whole item
    fn put_item(&self, table: &str, entity: &Entity) -> Result<(), StoreError>;

    /// Set the four non-key attributes of the item, creating it if absent
    fn update_item(&self, table: &str, entity: &Entity) -> Result<(), StoreError>;

    /// Read a single item by key
    fn get_item(&self, table: &str, key: &EntityKey) -> Result<Option<Entity>, StoreError>;

    /// Delete an item by key; deleting a missing key is not an error
    fn delete_item(&self, table: &str, key: &EntityKey) -> Result<(), StoreError>;
}

/// SQLite-backed entity backend
///
/// Holds only the database path; every call opens its own connection.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    db_path: PathBuf,
}

impl SqliteBackend {
    /// Create a backend for the given database file, creating its parent directory
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        debug!(?db_path, "SqliteBackend::new: called");
        Ok(Self { db_path })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.db_path)?)
    }
}

/// Quote a table name as an SQL identifier
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn row_to_entity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entity> {
    Ok(Entity {
        profile_name: row.get(0)?,
        entity: row.get(1)?,
        entity_type: row.get(2)?,
        entity_count: row.get(3)?,
        entity_table_info: row.get(4)?,
        time_str: row.get(5)?,
    })
}

impl EntityBackend for SqliteBackend {
    fn describe_table(&self, table: &str) -> Result<(), StoreError> {
        debug!(%table, "describe_table: called");
        let conn = self.connect()?;
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(_) => Ok(()),
            None => Err(StoreError::TableNotFound {
                table: table.to_string(),
            }),
        }
    }

    fn create_table(&self, table: &str) -> Result<(), StoreError> {
        debug!(%table, "create_table: called");
        let conn = self.connect()?;
        conn.execute(
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    profile_name TEXT NOT NULL,
                    entity TEXT NOT NULL,
                    entity_type TEXT NOT NULL,
                    entity_count INTEGER NOT NULL,
                    entity_table_info TEXT NOT NULL,
                    time_str TEXT NOT NULL,
                    PRIMARY KEY (profile_name, entity)
                )
                "#,
                quote_ident(table)
            ),
            [],
        )?;
        info!(%table, db = ?self.db_path, "Entity table created");
        Ok(())
    }

    fn put_item(&self, table: &str, entity: &Entity) -> Result<(), StoreError> {
        debug!(%table, key = %entity.key(), "put_item: called");
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (profile_name, entity, entity_type, entity_count, entity_table_info, time_str) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                quote_ident(table)
            ),
            params![
                entity.profile_name,
                entity.entity,
                entity.entity_type,
                entity.entity_count,
                entity.entity_table_info,
                entity.time_str
            ],
        )?;
        Ok(())
    }

    fn update_item(&self, table: &str, entity: &Entity) -> Result<(), StoreError> {
        debug!(%table, key = %entity.key(), "update_item: called");
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (profile_name, entity, entity_type, entity_count, entity_table_info, time_str) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT (profile_name, entity) DO UPDATE SET \
                 entity_type = excluded.entity_type, \
                 entity_count = excluded.entity_count, \
                 entity_table_info = excluded.entity_table_info, \
                 time_str = excluded.time_str",
                quote_ident(table)
            ),
            params![
                entity.profile_name,
                entity.entity,
                entity.entity_type,
                entity.entity_count,
                entity.entity_table_info,
                entity.time_str
            ],
        )?;
        Ok(())
    }

    fn get_item(&self, table: &str, key: &EntityKey) -> Result<Option<Entity>, StoreError> {
        debug!(%table, %key, "get_item: called");
        let conn = self.connect()?;
        let entity = conn
            .query_row(
                &format!(
                    "SELECT profile_name, entity, entity_type, entity_count, entity_table_info, time_str \
                     FROM {} WHERE profile_name = ?1 AND entity = ?2",
                    quote_ident(table)
                ),
                params![key.profile_name, key.entity],
                row_to_entity,
            )
            .optional()?;
        Ok(entity)
    }

    fn delete_item(&self, table: &str, key: &EntityKey) -> Result<(), StoreError> {
        debug!(%table, %key, "delete_item: called");
        let conn = self.connect()?;
        let removed = conn.execute(
            &format!(
                "DELETE FROM {} WHERE profile_name = ?1 AND entity = ?2",
                quote_ident(table)
            ),
            params![key.profile_name, key.entity],
        )?;
        debug!(%key, removed, "delete_item: complete");
        Ok(())
    }
}
