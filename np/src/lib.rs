//! nlqprompt - prompt orchestration for natural-language-to-SQL
//!
//! Given a user question, a database schema, retrieved few-shot examples and a
//! target SQL dialect, nlqprompt selects the system/user template pair for a
//! task category and model, and renders it into plain text for an LLM call.
//!
//! # Core Concepts
//!
//! - **Build once, read many**: the template registry and model aliases are
//!   assembled at startup and shared immutably afterwards
//! - **Total substitution**: a render either fills every placeholder or fails
//!   naming the missing one
//! - **Deterministic output**: the same inputs always render byte-identical prompts
//!
//! # Modules
//!
//! - [`domain`] - Task categories, dialects, schema descriptors, few-shot examples
//! - [`prompts`] - Template registry, model aliases, loader and resolver
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface
//!
//! Entity persistence lives in the `entitystore` crate.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod prompts;

// Re-export commonly used types
pub use config::Config;
pub use domain::{AgentExample, Dialect, NerExample, SchemaDescriptor, SqlExample, TableSchema, TaskCategory};
pub use error::PromptError;
pub use prompts::{
    ModelAliases, PromptParams, PromptResolver, RenderedPrompt, Role, TemplateCatalog, TemplateRegistry,
    create_table_ddl, render_schema,
};
