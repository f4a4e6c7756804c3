//! Domain types for prompt rendering
//!
//! Task categories, SQL dialects, schema descriptors and few-shot examples.
//! Schema descriptors and examples come from external collaborators (schema
//! loader, retrieval index) and are consumed read-only here.

mod dialect;
mod example;
mod schema;
mod task;

pub use dialect::Dialect;
pub use example::{AgentExample, NerExample, SqlExample, format_agent_examples, format_ner_examples, format_sql_examples};
pub use schema::{SchemaDescriptor, TableSchema};
pub use task::{DialectStep, TaskCategory, TaskSpec};
