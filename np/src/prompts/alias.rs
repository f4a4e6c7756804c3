//! Model alias resolution
//!
//! External model identifiers are provider-specific strings such as
//! `anthropic.claude-3-haiku-20240307-v1:0`. Templates are indexed by a short
//! internal model key instead.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::PromptError;

/// Builtin (external id, model key) pairs
pub const BUILTIN_ALIASES: [(&str, &str); 5] = [
    ("anthropic.claude-3-haiku-20240307-v1:0", "haiku-20240307v1-0"),
    ("anthropic.claude-3-sonnet-20240229-v1:0", "sonnet-20240229v1-0"),
    ("anthropic.claude-3-5-sonnet-20240620-v1:0", "sonnet-3-5-20240620v1-0"),
    ("mistral.mixtral-8x7b-instruct-v0:1", "mixtral-8x7b-instruct-0"),
    ("meta.llama3-70b-instruct-v1:0", "llama3-70b-instruct-0"),
];

/// Mapping from external model id to model key
#[derive(Debug, Clone, Default)]
pub struct ModelAliases {
    by_id: BTreeMap<String, String>,
}

impl ModelAliases {
    /// Empty alias table
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias table holding the builtin models
    pub fn builtin() -> Self {
        let mut aliases = Self::new();
        for (model_id, model_key) in BUILTIN_ALIASES {
            aliases.register(model_id, model_key);
        }
        aliases
    }

    /// Register an alias; an existing alias for the same id is replaced
    pub fn register(&mut self, model_id: impl Into<String>, model_key: impl Into<String>) {
        let model_id = model_id.into();
        let model_key = model_key.into();
        debug!(%model_id, %model_key, "ModelAliases::register: called");
        if let Some(previous) = self.by_id.insert(model_id.clone(), model_key.clone())
            && previous != model_key
        {
            warn!(%model_id, %previous, %model_key, "Model alias replaced");
        }
    }

    /// Resolve an external model id to its model key
    pub fn alias_for(&self, model_id: &str) -> Result<&str, PromptError> {
        self.by_id
            .get(model_id)
            .map(String::as_str)
            .ok_or_else(|| PromptError::UnknownModel {
                model_id: model_id.to_string(),
            })
    }

    /// Distinct model keys, sorted
    pub fn model_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_id.values().cloned().collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// (external id, model key) pairs sorted by id
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_id.iter().map(|(id, key)| (id.as_str(), key.as_str()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
