//! Template registry
//!
//! Maps (task category, model key, role) to template text. Built once through
//! [`RegistryBuilder`] during startup; the built [`TemplateRegistry`] has no
//! mutating methods and is shared by reference across requests.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::TaskCategory;
use crate::error::PromptError;

/// Which side of the conversation a template is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TemplateKey {
    category: TaskCategory,
    model_key: String,
    role: Role,
}

/// System and user templates for one (category, model key)
#[derive(Debug, Clone, Copy)]
pub struct TemplatePair<'a> {
    pub system: &'a str,
    pub user: &'a str,
}

/// A placeholder that a category's resolver never supplies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanPlaceholder {
    pub category: TaskCategory,
    pub model_key: String,
    pub role: Role,
    pub placeholder: String,
}

// Matches `{{name}}`, `{{~ name ~}}` and path lookups like `{{name.field}}`; group 1 is the root key
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{~?\s*([A-Za-z_][A-Za-z0-9_]*)(?:\.[A-Za-z0-9_]+)*\s*~?\}\}").expect("placeholder regex is valid")
});

/// Root keys of all `{{name}}` placeholders in a template, sorted and deduplicated
pub fn placeholders(template: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Mutable registry used during initialization
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    templates: HashMap<TemplateKey, String>,
    fallback_schemas: HashMap<String, String>,
    guidance: HashMap<String, String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, overwriting any previous one for the same slot
    ///
    /// Placeholder syntax is not checked here; that happens at render time.
    pub fn register(
        &mut self,
        category: TaskCategory,
        model_key: impl Into<String>,
        role: Role,
        template: impl Into<String>,
    ) -> &mut Self {
        let key = TemplateKey {
            category,
            model_key: model_key.into(),
            role,
        };
        debug!(%category, model_key = %key.model_key, %role, "register: called");
        self.templates.insert(key, template.into());
        self
    }

    /// Register the schema text used when a request carries no schema
    pub fn register_fallback_schema(&mut self, model_key: impl Into<String>, schema: impl Into<String>) -> &mut Self {
        self.fallback_schemas.insert(model_key.into(), schema.into());
        self
    }

    /// Register the SQL-writing guidance block for a model
    pub fn register_guidance(&mut self, model_key: impl Into<String>, guidance: impl Into<String>) -> &mut Self {
        self.guidance.insert(model_key.into(), guidance.into());
        self
    }

    /// Freeze the registry
    pub fn build(self) -> TemplateRegistry {
        info!(
            templates = self.templates.len(),
            fallback_schemas = self.fallback_schemas.len(),
            "Template registry built"
        );
        TemplateRegistry {
            templates: self.templates,
            fallback_schemas: self.fallback_schemas,
            guidance: self.guidance,
        }
    }
}

/// Immutable template lookup table
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateKey, String>,
    fallback_schemas: HashMap<String, String>,
    guidance: HashMap<String, String>,
}

impl TemplateRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Look up one template
    pub fn resolve(&self, category: TaskCategory, model_key: &str, role: Role) -> Result<&str, PromptError> {
        let key = TemplateKey {
            category,
            model_key: model_key.to_string(),
            role,
        };
        self.templates
            .get(&key)
            .map(String::as_str)
            .ok_or_else(|| PromptError::TemplateNotFound {
                category,
                model_key: model_key.to_string(),
                role,
            })
    }

    /// Look up both templates for a (category, model key)
    pub fn template_pair(&self, category: TaskCategory, model_key: &str) -> Result<TemplatePair<'_>, PromptError> {
        Ok(TemplatePair {
            system: self.resolve(category, model_key, Role::System)?,
            user: self.resolve(category, model_key, Role::User)?,
        })
    }

    pub fn fallback_schema(&self, model_key: &str) -> Option<&str> {
        self.fallback_schemas.get(model_key).map(String::as_str)
    }

    pub fn guidance(&self, model_key: &str) -> Option<&str> {
        self.guidance.get(model_key).map(String::as_str)
    }

    /// Registered (category, model key) pairs, sorted
    pub fn entries(&self) -> Vec<(TaskCategory, &str)> {
        let set: BTreeSet<(TaskCategory, &str)> = self
            .templates
            .keys()
            .map(|k| (k.category, k.model_key.as_str()))
            .collect();
        set.into_iter().collect()
    }

    /// Placeholders that no resolver path for their category supplies
    ///
    /// An empty result means every registered template can be fully rendered.
    pub fn orphan_placeholders(&self) -> Vec<OrphanPlaceholder> {
        let mut orphans: Vec<OrphanPlaceholder> = self
            .templates
            .iter()
            .flat_map(|(key, template)| {
                let supplied = key.category.spec().supplied_keys();
                placeholders(template)
                    .into_iter()
                    .filter(move |name| !supplied.iter().any(|s| *s == name.as_str()))
                    .map(move |placeholder| OrphanPlaceholder {
                        category: key.category,
                        model_key: key.model_key.clone(),
                        role: key.role,
                        placeholder,
                    })
            })
            .collect();
        orphans.sort_by(|a, b| {
            (a.category, &a.model_key, a.role, &a.placeholder).cmp(&(b.category, &b.model_key, b.role, &b.placeholder))
        });
        orphans
    }
}
