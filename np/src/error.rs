//! Prompt error types

use thiserror::Error;

use crate::domain::TaskCategory;
use crate::prompts::Role;

/// Errors that can occur while resolving or rendering a prompt
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Unknown model id: {model_id}")]
    UnknownModel { model_id: String },

    #[error("No {role} template registered for {category} on model {model_key}")]
    TemplateNotFound {
        category: TaskCategory,
        model_key: String,
        role: Role,
    },

    #[error("No fallback schema registered for model {model_key}")]
    MissingFallbackSchema { model_key: String },

    #[error("Missing prompt parameter '{placeholder}' for {category}")]
    PromptRender {
        category: TaskCategory,
        placeholder: String,
    },

    #[error("Invalid table description: {0}")]
    InvalidTableDescription(String),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

impl PromptError {
    /// Check if this error points at a registration gap rather than bad input
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            PromptError::TemplateNotFound { .. } | PromptError::MissingFallbackSchema { .. }
        )
    }

    /// Name of the missing placeholder, if this is a render error
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            PromptError::PromptRender { placeholder, .. } => Some(placeholder),
            _ => None,
        }
    }
}
