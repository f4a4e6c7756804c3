//! Schema rendering
//!
//! Flattens a [`SchemaDescriptor`] into the text block injected into prompts,
//! and converts YAML-like table descriptions into `CREATE TABLE` statements.

use tracing::debug;

use super::registry::TemplateRegistry;
use crate::domain::SchemaDescriptor;
use crate::error::PromptError;

/// Render a schema block for a model
///
/// Each table becomes a `name: description` header, its column text, and a
/// blank line, in descriptor order. An empty descriptor yields the model's
/// fallback schema; a rendered block is never empty.
pub fn render_schema(
    schema: &SchemaDescriptor,
    model_key: &str,
    registry: &TemplateRegistry,
) -> Result<String, PromptError> {
    debug!(tables = schema.len(), %model_key, "render_schema: called");
    if schema.is_empty() {
        debug!("render_schema: no tables, using fallback");
        return registry
            .fallback_schema(model_key)
            .filter(|text| !text.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| PromptError::MissingFallbackSchema {
                model_key: model_key.to_string(),
            });
    }

    let block = schema
        .iter()
        .map(|(name, table)| format!("{}: {}\n{}\n\n", name, table.description, table.ddl))
        .collect();
    Ok(block)
}

#[derive(Debug, Default)]
struct Column {
    name: String,
    datatype: Option<String>,
    comment: String,
    annotation: String,
}

/// Convert a table description into a commented `CREATE TABLE` statement
///
/// Expected input:
///
/// ```text
/// orders: hotel orders
/// - name: order_id
///   datatype: bigint
///   comment: order id
///   annotation: primary key
/// ```
pub fn create_table_ddl(description: &str) -> Result<String, PromptError> {
    let mut lines = description.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| PromptError::InvalidTableDescription("description is empty".to_string()))?;
    let (table_name, table_comment) = header.split_once(':').ok_or_else(|| {
        PromptError::InvalidTableDescription(format!("header '{}' is not 'table: comment'", header))
    })?;
    let table_name = table_name.trim();
    if table_name.is_empty() {
        return Err(PromptError::InvalidTableDescription("table name is empty".to_string()));
    }

    let mut columns: Vec<Column> = Vec::new();
    for line in lines {
        if let Some(rest) = line.strip_prefix("- name:") {
            columns.push(Column {
                name: rest.trim().to_string(),
                ..Default::default()
            });
            continue;
        }
        let Some(column) = columns.last_mut() else {
            return Err(PromptError::InvalidTableDescription(format!(
                "'{}' appears before any column",
                line
            )));
        };
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "datatype" | "type" => column.datatype = Some(value),
            "comment" => column.comment = value,
            "annotation" => column.annotation = value,
            other => debug!(key = %other, "create_table_ddl: ignoring column attribute"),
        }
    }

    if columns.is_empty() {
        return Err(PromptError::InvalidTableDescription(format!(
            "table '{}' has no columns",
            table_name
        )));
    }

    let mut body = Vec::with_capacity(columns.len());
    let last = columns.len() - 1;
    for (i, column) in columns.iter().enumerate() {
        if column.name.is_empty() {
            return Err(PromptError::InvalidTableDescription(format!(
                "column {} of '{}' has no name",
                i + 1,
                table_name
            )));
        }
        let datatype = column.datatype.as_deref().ok_or_else(|| {
            PromptError::InvalidTableDescription(format!("column '{}' has no datatype", column.name))
        })?;
        let separator = if i == last { "" } else { "," };
        body.push(format!(
            "  {} {} COMMENT '{}'{}",
            column.name,
            datatype,
            column.comment.replace('\'', "''"),
            separator
        ));
        if !column.annotation.is_empty() {
            body.push(format!("  -- annotation: {}", column.annotation));
        }
    }

    Ok(format!(
        "-- {}\nCREATE TABLE {} (\n{}\n);",
        table_comment.trim(),
        table_name,
        body.join("\n")
    ))
}
