//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::TaskCategory;

/// nlqprompt - prompt rendering for natural-language-to-SQL
#[derive(Parser, Debug)]
#[command(
    name = "np",
    version,
    about = "Render NL2SQL prompts and manage extracted entities",
    after_help = "Logs are written to stderr. Use -v or RUST_LOG=debug for more detail."
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the system and user prompts for a task
    Render {
        /// Task category (text2sql, intent, query_rewrite, ...)
        #[arg(short, long)]
        task: TaskCategory,

        /// External model identifier
        #[arg(short, long)]
        model: String,

        /// Named parameter, repeatable
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Schema descriptor file (JSON or YAML map of table name to description and ddl)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// SQL few-shot examples file (JSON or YAML list)
        #[arg(long)]
        sql_examples: Option<PathBuf>,

        /// NER examples file (JSON or YAML list)
        #[arg(long)]
        ner_examples: Option<PathBuf>,

        /// Agent decomposition examples file (JSON or YAML list)
        #[arg(long)]
        agent_examples: Option<PathBuf>,

        /// SQL dialect (postgresql, mysql, redshift, starrocks, clickhouse)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List known model identifiers and their model keys
    Models,

    /// List registered templates
    Templates {
        /// Only show this task category
        #[arg(short, long)]
        task: Option<TaskCategory>,
    },

    /// Print a CREATE TABLE statement for a table description file
    Ddl {
        /// Table description file
        file: PathBuf,
    },

    /// Manage extracted entities
    Entity {
        #[command(subcommand)]
        command: EntityCommand,
    },
}

/// Entity store subcommands
#[derive(Subcommand, Debug)]
pub enum EntityCommand {
    /// Create the entity table if it does not exist
    Ensure,

    /// Record a first observation of an entity
    Add {
        /// Owning profile
        #[arg(short, long)]
        owner: String,

        /// Entity text
        #[arg(short, long)]
        entity: String,

        /// Entity category
        #[arg(short = 't', long = "type")]
        entity_type: String,

        /// Source table info
        #[arg(long, default_value = "")]
        table_info: String,
    },

    /// Show an entity
    Get {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        entity: String,
    },

    /// Record another observation of an existing entity
    Update {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        entity: String,

        /// Replacement source table info
        #[arg(long)]
        table_info: Option<String>,
    },

    /// Delete an entity
    Delete {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        entity: String,
    },
}

/// Output format for rendered prompts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Parse `key=value`; the value may itself contain `=`
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter '{}': expected KEY=VALUE", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Invalid parameter '{}': empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("question=a=b").unwrap(), ("question".to_string(), "a=b".to_string()));
        assert_eq!(parse_param("data=").unwrap(), ("data".to_string(), String::new()));
        assert!(parse_param("question").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "np",
            "render",
            "--task",
            "text2sql",
            "--model",
            "meta.llama3-70b-instruct-v1:0",
            "-p",
            "question=top hotels",
            "--dialect",
            "redshift",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Command::Render {
                task, params, format, ..
            } => {
                assert_eq!(task, TaskCategory::Text2Sql);
                assert_eq!(params, vec![("question".to_string(), "top hotels".to_string())]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("table".parse::<OutputFormat>().is_err());
    }
}
