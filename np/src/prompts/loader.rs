//! Template catalog loading
//!
//! Templates are loaded from:
//! 1. Builtin (embedded in binary)
//! 2. The self-hosted model set, when configured
//! 3. Override directories (`~/.config/nlqprompt/templates/*.yml`, `.nlqprompt/templates/*.yml`)
//!
//! Later registrations override earlier ones for the same (category, model key, role).
//!
//! ## Document format
//!
//! ```yaml
//! category: intent
//! shared:
//!   system: |
//!     You are an intent classifier...
//!   user: |
//!     The question is : {{question}}
//! models:
//!   mixtral-8x7b-instruct-0:
//!     system: |
//!       ...
//! ```
//!
//! `shared` applies to every model key known when the document is loaded;
//! `models` entries then override it role by role.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::alias::ModelAliases;
use super::embedded::{BUILTIN_DOCUMENTS, DEFAULT_SCHEMA, SELF_HOSTED_DOCUMENTS, SQL_GUIDANCE};
use super::registry::{RegistryBuilder, Role, TemplateRegistry};
use crate::config::Config;
use crate::domain::TaskCategory;

/// Optional system and user template text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePairDef {
    #[serde(default)]
    pub system: Option<String>,

    #[serde(default)]
    pub user: Option<String>,
}

/// One template document as loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub category: TaskCategory,

    /// Templates applied to every known model key
    #[serde(default)]
    pub shared: Option<TemplatePairDef>,

    /// Per-model templates, keyed by model key
    #[serde(default)]
    pub models: BTreeMap<String, TemplatePairDef>,
}

impl TemplateDocument {
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse template document")
    }

    /// Register this document's templates, returning how many were written
    pub fn register_into(&self, builder: &mut RegistryBuilder, model_keys: &[String]) -> usize {
        debug!(category = %self.category, model_count = model_keys.len(), "register_into: called");
        let mut count = 0;
        if let Some(shared) = &self.shared {
            for model_key in model_keys {
                count += register_pair(builder, self.category, model_key, shared);
            }
        }
        for (model_key, pair) in &self.models {
            count += register_pair(builder, self.category, model_key, pair);
        }
        count
    }
}

fn register_pair(builder: &mut RegistryBuilder, category: TaskCategory, model_key: &str, pair: &TemplatePairDef) -> usize {
    let mut count = 0;
    for (role, text) in [(Role::System, &pair.system), (Role::User, &pair.user)] {
        if let Some(text) = text {
            builder.register(category, model_key, role, text.as_str());
            count += 1;
        }
    }
    count
}

/// Alias table and frozen registry, ready to share with resolvers
#[derive(Debug)]
pub struct TemplateCatalog {
    pub aliases: ModelAliases,
    pub registry: TemplateRegistry,
}

impl TemplateCatalog {
    /// Builtin models and templates only
    pub fn builtin() -> Result<Self> {
        debug!("TemplateCatalog::builtin: called");
        let mut loader = CatalogLoader::new();
        loader.load_builtins()?;
        Ok(loader.finish())
    }

    /// Load everything the configuration enables
    pub fn load(config: &Config) -> Result<Self> {
        debug!("TemplateCatalog::load: called");
        let mut loader = CatalogLoader::new();

        if config.templates.use_builtin() {
            loader.load_builtins()?;
        } else {
            debug!("load: builtin templates disabled");
        }

        if config.self_hosted.is_enabled() {
            loader.load_self_hosted(&config.self_hosted.model_id, &config.self_hosted.model_name)?;
        }

        for path in config.templates.expanded_paths() {
            if path.is_dir() {
                loader.load_from_directory(&path)?;
            } else {
                debug!(?path, "load: directory does not exist, skipping");
            }
        }

        let catalog = loader.finish();
        info!(
            models = catalog.aliases.len(),
            entries = catalog.registry.entries().len(),
            "Loaded template catalog"
        );
        Ok(catalog)
    }
}

/// Mutable state while the catalog is being assembled
struct CatalogLoader {
    aliases: ModelAliases,
    builder: RegistryBuilder,
}

impl CatalogLoader {
    fn new() -> Self {
        Self {
            aliases: ModelAliases::new(),
            builder: RegistryBuilder::new(),
        }
    }

    fn load_builtins(&mut self) -> Result<()> {
        debug!("load_builtins: called");
        let builtin = ModelAliases::builtin();
        for (model_id, model_key) in builtin.iter() {
            self.aliases.register(model_id, model_key);
        }

        let model_keys = builtin.model_keys();
        for model_key in &model_keys {
            self.builder.register_fallback_schema(model_key.as_str(), DEFAULT_SCHEMA);
            self.builder.register_guidance(model_key.as_str(), SQL_GUIDANCE);
        }

        for (name, content) in BUILTIN_DOCUMENTS {
            let doc = TemplateDocument::parse(content).with_context(|| format!("Failed to parse builtin template: {}", name))?;
            let count = doc.register_into(&mut self.builder, &model_keys);
            debug!(%name, count, "load_builtins: registered document");
        }
        Ok(())
    }

    fn load_self_hosted(&mut self, model_id: &str, model_name: &str) -> Result<()> {
        debug!(%model_id, %model_name, "load_self_hosted: called");
        self.aliases.register(model_id, model_name);
        self.builder.register_fallback_schema(model_name, DEFAULT_SCHEMA);

        let model_keys = [model_name.to_string()];
        for (name, content) in SELF_HOSTED_DOCUMENTS {
            let doc = TemplateDocument::parse(content)
                .with_context(|| format!("Failed to parse self-hosted template: {}", name))?;
            doc.register_into(&mut self.builder, &model_keys);
        }
        info!(%model_id, %model_name, "Registered self-hosted model");
        Ok(())
    }

    /// Load all .yml files from a directory, in file name order
    fn load_from_directory(&mut self, dir: &Path) -> Result<()> {
        debug!(?dir, "load_from_directory: called");

        let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "yml" || e == "yaml").unwrap_or(false))
            .collect();
        paths.sort();

        for path in paths {
            if let Err(e) = self.load_from_file(&path) {
                warn!(?path, error = %e, "Failed to load template file");
            }
        }
        Ok(())
    }

    fn load_from_file(&mut self, path: &Path) -> Result<()> {
        debug!(?path, "load_from_file: called");
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        let doc = TemplateDocument::parse(&content).with_context(|| format!("Failed to parse: {}", path.display()))?;
        let count = doc.register_into(&mut self.builder, &self.aliases.model_keys());
        info!(?path, category = %doc.category, count, "Loaded template overrides");
        Ok(())
    }

    fn finish(self) -> TemplateCatalog {
        TemplateCatalog {
            aliases: self.aliases,
            registry: self.builder.build(),
        }
    }
}
