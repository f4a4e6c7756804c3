//! Task categories and their declarative rendering specs

use serde::{Deserialize, Serialize};

/// One prompt use-case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Natural language to SQL
    #[serde(rename = "text2sql")]
    Text2Sql,
    /// Intent classification and keyword extraction
    Intent,
    /// Rewrite a follow-up question using chat history
    QueryRewrite,
    /// Answer from general knowledge instead of data
    Knowledge,
    /// Break a complex question into sub-tasks
    Agent,
    /// Analyse data gathered for agent sub-tasks
    AgentAnalyse,
    /// Describe a query result in natural language
    DataSummary,
    /// Pick a chart type for a query result
    DataVisualization,
    /// Generate a saved-chart spec for a BI tool
    SupersetChart,
    /// Review and optimize a SQL statement
    SqlOptimization,
    /// Suggest follow-up questions
    Suggestion,
}

impl TaskCategory {
    /// All categories in listing order
    pub const ALL: [TaskCategory; 11] = [
        TaskCategory::QueryRewrite,
        TaskCategory::Text2Sql,
        TaskCategory::Intent,
        TaskCategory::Knowledge,
        TaskCategory::Agent,
        TaskCategory::AgentAnalyse,
        TaskCategory::DataSummary,
        TaskCategory::DataVisualization,
        TaskCategory::Suggestion,
        TaskCategory::SupersetChart,
        TaskCategory::SqlOptimization,
    ];

    /// Stable key used in template documents and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text2Sql => "text2sql",
            Self::Intent => "intent",
            Self::QueryRewrite => "query_rewrite",
            Self::Knowledge => "knowledge",
            Self::Agent => "agent",
            Self::AgentAnalyse => "agent_analyse",
            Self::DataSummary => "data_summary",
            Self::DataVisualization => "data_visualization",
            Self::SupersetChart => "superset_chart",
            Self::SqlOptimization => "sql_optimization",
            Self::Suggestion => "suggestion",
        }
    }

    /// Display title for prompt management listings
    pub fn title(&self) -> &'static str {
        match self {
            Self::Text2Sql => "Text2SQL Prompt",
            Self::Intent => "Intent Prompt",
            Self::QueryRewrite => "Query Rewrite",
            Self::Knowledge => "Knowledge Prompt",
            Self::Agent => "Agent Task Prompt",
            Self::AgentAnalyse => "Agent Data Analyse Prompt",
            Self::DataSummary => "Data Summary Prompt",
            Self::DataVisualization => "Data Visualization Prompt",
            Self::SupersetChart => "Superset Chart Prompt",
            Self::SqlOptimization => "SQL Optimization Prompt",
            Self::Suggestion => "Suggest Question Prompt",
        }
    }

    /// Rendering steps and parameters for this category
    pub fn spec(&self) -> &'static TaskSpec {
        match self {
            Self::Text2Sql => &TEXT2SQL,
            Self::Intent | Self::Knowledge | Self::Suggestion => &QUESTION_ONLY,
            Self::QueryRewrite => &QUERY_REWRITE,
            Self::Agent => &AGENT,
            Self::AgentAnalyse | Self::DataSummary | Self::DataVisualization => &QUESTION_AND_DATA,
            Self::SupersetChart => &SUPERSET_CHART,
            Self::SqlOptimization => &SQL_OPTIMIZATION,
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("Unknown task category: {}. Use one of: {}", s, known.join(", "))
            })
    }
}

/// How a category consumes the dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectStep {
    /// Dialect is not used
    None,
    /// Fill `dialect_prompt` with the dialect preamble and `dialect` with its display name
    Preamble,
    /// Fill `database_engine` with the dialect name as given
    EngineName,
}

/// Declarative description of one category's rendering
///
/// Slot fields name the placeholder that receives the derived text.
#[derive(Debug)]
pub struct TaskSpec {
    /// Parameters the caller must supply
    pub required: &'static [&'static str],
    /// Parameters rendered as empty text when absent
    pub optional: &'static [&'static str],
    pub schema_slot: Option<&'static str>,
    pub dialect: DialectStep,
    pub sql_examples_slot: Option<&'static str>,
    pub ner_examples_slot: Option<&'static str>,
    pub agent_examples_slot: Option<&'static str>,
    pub guidance_slot: Option<&'static str>,
}

impl TaskSpec {
    /// Every placeholder name a template of this category may use
    pub fn supplied_keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.required.iter().chain(self.optional).copied().collect();
        keys.extend(
            [
                self.schema_slot,
                self.sql_examples_slot,
                self.ner_examples_slot,
                self.agent_examples_slot,
                self.guidance_slot,
            ]
            .into_iter()
            .flatten(),
        );
        match self.dialect {
            DialectStep::None => {}
            DialectStep::Preamble => keys.extend(["dialect", "dialect_prompt"]),
            DialectStep::EngineName => keys.push("database_engine"),
        }
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

const BASE: TaskSpec = TaskSpec {
    required: &[],
    optional: &[],
    schema_slot: None,
    dialect: DialectStep::None,
    sql_examples_slot: None,
    ner_examples_slot: None,
    agent_examples_slot: None,
    guidance_slot: None,
};

static TEXT2SQL: TaskSpec = TaskSpec {
    required: &["question"],
    schema_slot: Some("sql_schema"),
    dialect: DialectStep::Preamble,
    sql_examples_slot: Some("examples"),
    ner_examples_slot: Some("ner_info"),
    guidance_slot: Some("sql_guidance"),
    ..BASE
};

static QUESTION_ONLY: TaskSpec = TaskSpec {
    required: &["question"],
    ..BASE
};

static QUERY_REWRITE: TaskSpec = TaskSpec {
    required: &["question", "chat_history"],
    ..BASE
};

static AGENT: TaskSpec = TaskSpec {
    required: &["question"],
    optional: &["sql_guidance"],
    schema_slot: Some("table_schema_data"),
    agent_examples_slot: Some("example_data"),
    ..BASE
};

static QUESTION_AND_DATA: TaskSpec = TaskSpec {
    required: &["question", "data"],
    ..BASE
};

static SUPERSET_CHART: TaskSpec = TaskSpec {
    required: &["question", "dataset_schema"],
    schema_slot: Some("sql_schema"),
    dialect: DialectStep::EngineName,
    sql_examples_slot: Some("examples"),
    ner_examples_slot: Some("ner_info"),
    ..BASE
};

static SQL_OPTIMIZATION: TaskSpec = TaskSpec {
    required: &["sql"],
    dialect: DialectStep::EngineName,
    ..BASE
};
