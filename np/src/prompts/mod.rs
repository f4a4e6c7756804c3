//! Prompt templates and rendering
//!
//! - [`alias`] - external model id to model key
//! - [`registry`] - (category, model key, role) to template text
//! - [`loader`] - builtin and on-disk template documents
//! - [`schema`] - schema block rendering and DDL generation
//! - [`resolver`] - the single render entry point
//! - [`chat`] - ChatML formatting for raw-prompt endpoints

pub mod alias;
pub mod chat;
pub mod embedded;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use alias::{BUILTIN_ALIASES, ModelAliases};
pub use chat::format_chatml;
pub use loader::{TemplateCatalog, TemplateDocument, TemplatePairDef};
pub use registry::{OrphanPlaceholder, RegistryBuilder, Role, TemplatePair, TemplateRegistry, placeholders};
pub use resolver::{PromptParams, PromptResolver, RenderedPrompt};
pub use schema::{create_table_ddl, render_schema};
