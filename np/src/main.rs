//! np - NL2SQL prompt renderer
//!
//! CLI entry point for rendering prompts, inspecting the template catalog and
//! managing extracted entities.

use std::fs;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::EnvFilter;

use entitystore::{Entity, EntityLookup, EntityStore};
use nlqprompt::cli::{Cli, Command, EntityCommand, OutputFormat};
use nlqprompt::config::Config;
use nlqprompt::domain::{SchemaDescriptor, TaskCategory};
use nlqprompt::prompts::{PromptParams, PromptResolver, RenderedPrompt, create_table_ddl};

/// `-v` forces debug; otherwise RUST_LOG applies, falling back to info
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn setup_logging(verbose: bool) -> Result<()> {
    // Logs go to stderr so stdout carries only command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(log_filter(verbose))
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    info!(default_dialect = %config.default_dialect, "nlqprompt loaded config");

    match cli.command {
        Command::Render {
            task,
            model,
            params,
            schema,
            sql_examples,
            ner_examples,
            agent_examples,
            dialect,
            format,
        } => {
            let mut prompt_params = PromptParams::new();
            for (key, value) in params {
                prompt_params = prompt_params.with_value(key, value);
            }
            if let Some(path) = schema {
                prompt_params = prompt_params.with_schema(read_document::<SchemaDescriptor>(&path)?);
            }
            if let Some(path) = sql_examples {
                prompt_params = prompt_params.with_sql_examples(read_document(&path)?);
            }
            if let Some(path) = ner_examples {
                prompt_params = prompt_params.with_ner_examples(read_document(&path)?);
            }
            if let Some(path) = agent_examples {
                prompt_params = prompt_params.with_agent_examples(read_document(&path)?);
            }
            if let Some(dialect) = dialect {
                prompt_params = prompt_params.with_dialect(dialect);
            }
            cmd_render(&config, task, &model, &prompt_params, format)
        }
        Command::Models => cmd_models(&config),
        Command::Templates { task } => cmd_templates(&config, task),
        Command::Ddl { file } => cmd_ddl(&file),
        Command::Entity { command } => cmd_entity(&config, command),
    }
}

/// Read a JSON or YAML document
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse: {}", path.display()))
}

fn cmd_render(
    config: &Config,
    task: TaskCategory,
    model_id: &str,
    params: &PromptParams,
    format: OutputFormat,
) -> Result<()> {
    let resolver = PromptResolver::from_config(config)?;
    let rendered: RenderedPrompt = resolver
        .render(task, model_id, params)
        .with_context(|| format!("Failed to render {} prompt for {}", task, model_id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rendered)?),
        OutputFormat::Text => {
            println!("{}", "=== system ===".cyan().bold());
            println!("{}", rendered.system);
            println!("{}", "=== user ===".cyan().bold());
            println!("{}", rendered.user);
        }
    }
    Ok(())
}

fn cmd_models(config: &Config) -> Result<()> {
    let resolver = PromptResolver::from_config(config)?;
    for (model_id, model_key) in resolver.aliases().iter() {
        println!("{} -> {}", model_id.yellow(), model_key);
    }
    Ok(())
}

fn cmd_templates(config: &Config, only: Option<TaskCategory>) -> Result<()> {
    let resolver = PromptResolver::from_config(config)?;
    let registry = resolver.registry();
    for (category, model_key) in registry.entries() {
        if only.is_some_and(|c| c != category) {
            continue;
        }
        println!(
            "{:<20} {:<28} {}",
            category.as_str().yellow(),
            category.title(),
            model_key.dimmed()
        );
    }

    let orphans = registry.orphan_placeholders();
    for orphan in &orphans {
        println!(
            "{} {} {} {} uses unsupplied placeholder '{}'",
            "!".red(),
            orphan.category,
            orphan.model_key,
            orphan.role,
            orphan.placeholder
        );
    }
    Ok(())
}

fn cmd_ddl(path: &Path) -> Result<()> {
    let description = fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))?;
    let ddl = create_table_ddl(&description)?;
    println!("{}", ddl);
    Ok(())
}

fn cmd_entity(config: &Config, command: EntityCommand) -> Result<()> {
    let db_path = config.entity_store.expanded_db_path();
    let store = EntityStore::open(&db_path, &config.entity_store.table_prefix)
        .with_context(|| format!("Failed to open entity store at {}", db_path.display()))?;

    match command {
        EntityCommand::Ensure => {
            println!("{} Table ready: {}", "✓".green(), store.table_name().cyan());
        }
        EntityCommand::Add {
            owner,
            entity,
            entity_type,
            table_info,
        } => {
            let record = Entity::new(owner, entity, entity_type, table_info);
            store.put(&record)?;
            println!("{} Added: {}", "✓".green(), record.key().to_string().cyan());
        }
        EntityCommand::Get { owner, entity } => match store.get_entity(&owner, &entity) {
            EntityLookup::Found(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            EntityLookup::NotFound => {
                return Err(eyre::eyre!("Entity not found: {}/{}", owner, entity));
            }
            EntityLookup::Unavailable(e) => return Err(e).context("Entity store unavailable"),
        },
        EntityCommand::Update {
            owner,
            entity,
            table_info,
        } => {
            let mut record = match store.get_entity(&owner, &entity) {
                EntityLookup::Found(record) => record,
                EntityLookup::NotFound => {
                    return Err(eyre::eyre!("Entity not found: {}/{}", owner, entity));
                }
                EntityLookup::Unavailable(e) => return Err(e).context("Entity store unavailable"),
            };
            let table_info = table_info.unwrap_or_else(|| record.entity_table_info.clone());
            record.observe(table_info);
            if !store.update_entity(&record) {
                return Err(eyre::eyre!("Failed to update entity: {}", record.key()));
            }
            println!(
                "{} Updated: {} (count {})",
                "✓".green(),
                record.key().to_string().cyan(),
                record.entity_count
            );
        }
        EntityCommand::Delete { owner, entity } => {
            if !store.delete_entity(&owner, &entity) {
                return Err(eyre::eyre!("Failed to delete entity: {}/{}", owner, entity));
            }
            println!("{} Deleted: {}/{}", "✓".green(), owner, entity);
        }
    }
    Ok(())
}
