//! nlqprompt configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Mode value that turns on the self-hosted model
pub const SELF_HOSTED_MODE: &str = "self-hosted";

/// Main nlqprompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template catalog search paths
    pub templates: TemplatesConfig,

    /// Optional self-hosted model registered at startup
    #[serde(rename = "self-hosted")]
    pub self_hosted: SelfHostedConfig,

    /// Entity store location
    #[serde(rename = "entity-store")]
    pub entity_store: EntityStoreConfig,

    /// Dialect used when a request does not name one
    #[serde(rename = "default-dialect")]
    pub default_dialect: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates: TemplatesConfig::default(),
            self_hosted: SelfHostedConfig::default(),
            entity_store: EntityStoreConfig::default(),
            default_dialect: "mysql".to_string(),
        }
    }
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.self_hosted.is_enabled() {
            if self.self_hosted.model_id.trim().is_empty() {
                return Err(eyre::eyre!(
                    "Self-hosted mode is on but no model id is set. Set self-hosted.model-id or DATA_ANALYSIS_MODEL_ID."
                ));
            }
            if self.self_hosted.model_name.trim().is_empty() {
                return Err(eyre::eyre!(
                    "Self-hosted mode is on but no model name is set. Set self-hosted.model-name or DATA_ANALYSIS_MODEL_NAME."
                ));
            }
        }
        Ok(())
    }

    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env();
        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .nlqprompt.yml
        let local_config = PathBuf::from(".nlqprompt.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/nlqprompt/nlqprompt.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("nlqprompt").join("nlqprompt.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Override settings from the process environment
    pub fn apply_env(&mut self) {
        let overrides = [
            ("DATA_ANALYSIS_MODE", &mut self.self_hosted.mode),
            ("DATA_ANALYSIS_MODEL_ID", &mut self.self_hosted.model_id),
            ("DATA_ANALYSIS_MODEL_NAME", &mut self.self_hosted.model_name),
            ("NLQ_ENTITY_TABLE_PREFIX", &mut self.entity_store.table_prefix),
            ("NLQ_ENTITY_DB_PATH", &mut self.entity_store.db_path),
        ];
        for (name, slot) in overrides {
            if let Ok(value) = std::env::var(name) {
                tracing::debug!(%name, "apply_env: override");
                *slot = value;
            }
        }
    }
}

/// Template catalog paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Paths to search for template documents (searched in order)
    pub paths: Vec<String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                "builtin".to_string(),
                "~/.config/nlqprompt/templates".to_string(),
                ".nlqprompt/templates".to_string(),
            ],
        }
    }
}

impl TemplatesConfig {
    /// Expand paths (resolve ~/ and relative paths)
    pub fn expanded_paths(&self) -> Vec<PathBuf> {
        self.paths
            .iter()
            .filter_map(|p| {
                if p == "builtin" {
                    None
                } else if let Some(rest) = p.strip_prefix("~/") {
                    dirs::home_dir().map(|home| home.join(rest))
                } else {
                    Some(PathBuf::from(p))
                }
            })
            .collect()
    }

    /// Check if the embedded catalog should be loaded
    pub fn use_builtin(&self) -> bool {
        self.paths.iter().any(|p| p == "builtin")
    }
}

/// Self-hosted model configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfHostedConfig {
    /// `self-hosted` enables registration; anything else leaves it off
    pub mode: String,

    /// External identifier callers pass as the model id
    #[serde(rename = "model-id")]
    pub model_id: String,

    /// Model key the templates are registered under
    #[serde(rename = "model-name")]
    pub model_name: String,
}

impl SelfHostedConfig {
    pub fn is_enabled(&self) -> bool {
        self.mode.trim().eq_ignore_ascii_case(SELF_HOSTED_MODE)
    }
}

/// Entity store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityStoreConfig {
    /// Prefix prepended to the entity table name
    #[serde(rename = "table-prefix")]
    pub table_prefix: String,

    /// SQLite database file
    #[serde(rename = "db-path")]
    pub db_path: String,
}

impl Default for EntityStoreConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/nlqprompt on Linux)
        let db_path = dirs::data_dir()
            .map(|d| d.join("nlqprompt"))
            .unwrap_or_else(|| PathBuf::from(".nlqprompt"))
            .join("entities.db")
            .to_string_lossy()
            .into_owned();

        Self {
            table_prefix: String::new(),
            db_path,
        }
    }
}

impl EntityStoreConfig {
    /// Database path with `~/` expanded
    pub fn expanded_db_path(&self) -> PathBuf {
        match self.db_path.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.db_path)),
            None => PathBuf::from(&self.db_path),
        }
    }
}
