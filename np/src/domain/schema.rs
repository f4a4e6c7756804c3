//! Table schema descriptions supplied by the schema loader

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One table's prompt-facing description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Human-readable table description
    #[serde(alias = "tbl_a")]
    pub description: String,

    /// Raw column listing or DDL text
    #[serde(alias = "col_a")]
    pub ddl: String,
}

/// Ordered mapping from table name to its description
///
/// Iteration follows insertion order, which keeps rendered prompts
/// deterministic. Serialized as a map in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescriptor {
    tables: Vec<(String, TableSchema)>,
}

impl SchemaDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any earlier entry with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, table: TableSchema) {
        let name = name.into();
        match self.tables.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = table,
            None => self.tables.push((name, table)),
        }
    }

    /// Builder-style `insert`
    pub fn with_table(mut self, name: impl Into<String>, description: impl Into<String>, ddl: impl Into<String>) -> Self {
        self.insert(
            name,
            TableSchema {
                description: description.into(),
                ddl: ddl.into(),
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableSchema)> {
        self.tables.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Serialize for SchemaDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for (name, table) in &self.tables {
            map.serialize_entry(name, table)?;
        }
        map.end()
    }
}

struct DescriptorVisitor;

impl<'de> Visitor<'de> for DescriptorVisitor {
    type Value = SchemaDescriptor;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of table name to {description, ddl}")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut descriptor = SchemaDescriptor::new();
        while let Some((name, table)) = access.next_entry::<String, TableSchema>()? {
            descriptor.insert(name, table);
        }
        Ok(descriptor)
    }
}

impl<'de> Deserialize<'de> for SchemaDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DescriptorVisitor)
    }
}
