//! Entity record type

use serde::{Deserialize, Serialize};

/// Format used for `time_str`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Composite key of an entity record: (profile_name, entity)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Partition key: owning profile
    pub profile_name: String,
    /// Sort key: entity text
    pub entity: String,
}

impl EntityKey {
    pub fn new(profile_name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            profile_name: profile_name.into(),
            entity: entity.into(),
        }
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.profile_name, self.entity)
    }
}

/// A persisted entity
///
/// Field names match the stored item attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity text (sort key)
    pub entity: String,

    /// Owning profile (partition key)
    pub profile_name: String,

    /// Entity category, e.g. "brand" or "metric"
    pub entity_type: String,

    /// Number of times the entity has been observed
    pub entity_count: i64,

    /// Source table info, usually serialized JSON
    pub entity_table_info: String,

    /// Last observation time
    pub time_str: String,
}

impl Entity {
    /// Create a first observation of an entity, stamped with the current time
    pub fn new(
        profile_name: impl Into<String>,
        entity: impl Into<String>,
        entity_type: impl Into<String>,
        entity_table_info: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            profile_name: profile_name.into(),
            entity_type: entity_type.into(),
            entity_count: 1,
            entity_table_info: entity_table_info.into(),
            time_str: now_str(),
        }
    }

    /// Record another observation: bump the count, replace table info, refresh the timestamp
    pub fn observe(&mut self, entity_table_info: impl Into<String>) {
        self.entity_count += 1;
        self.entity_table_info = entity_table_info.into();
        self.time_str = now_str();
    }

    /// Composite key of this entity
    pub fn key(&self) -> EntityKey {
        EntityKey::new(&self.profile_name, &self.entity)
    }
}

fn now_str() -> String {
    chrono::Local::now().format(TIME_FORMAT).to_string()
}
