//! Few-shot examples retrieved from the search index
//!
//! Each kind accepts either a plain object or a raw index hit whose fields
//! sit under `_source`.

use serde::{Deserialize, Deserializer, Serialize};

/// A (question, SQL) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlExample {
    pub question: String,
    pub sql: String,
}

/// A named entity with its explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NerExample {
    pub entity: String,
    pub comment: String,
}

/// A decomposition example for the agent task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentExample {
    pub query: String,
    pub comment: String,
}

impl SqlExample {
    pub fn new(question: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            sql: sql.into(),
        }
    }
}

impl NerExample {
    pub fn new(entity: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            comment: comment.into(),
        }
    }
}

impl AgentExample {
    pub fn new(query: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            comment: comment.into(),
        }
    }
}

/// Either the fields themselves or a search hit wrapping them
#[derive(Deserialize)]
#[serde(untagged)]
enum Hit<T> {
    Wrapped {
        #[serde(rename = "_source")]
        source: T,
    },
    Plain(T),
}

impl<T> Hit<T> {
    fn into_inner(self) -> T {
        match self {
            Hit::Wrapped { source } => source,
            Hit::Plain(inner) => inner,
        }
    }
}

#[derive(Deserialize)]
struct SqlFields {
    #[serde(alias = "text")]
    question: String,
    sql: String,
}

#[derive(Deserialize)]
struct NerFields {
    entity: String,
    comment: String,
}

#[derive(Deserialize)]
struct AgentFields {
    query: String,
    comment: String,
}

impl<'de> Deserialize<'de> for SqlExample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Hit::<SqlFields>::deserialize(deserializer)?.into_inner();
        Ok(Self::new(fields.question, fields.sql))
    }
}

impl<'de> Deserialize<'de> for NerExample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Hit::<NerFields>::deserialize(deserializer)?.into_inner();
        Ok(Self::new(fields.entity, fields.comment))
    }
}

impl<'de> Deserialize<'de> for AgentExample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Hit::<AgentFields>::deserialize(deserializer)?.into_inner();
        Ok(Self::new(fields.query, fields.comment))
    }
}

/// Format SQL examples in retrieval order
pub fn format_sql_examples(examples: &[SqlExample]) -> String {
    examples
        .iter()
        .map(|e| format!("Q: {}\nA: ```sql\n{}```\n", e.question, e.sql))
        .collect()
}

/// Format NER examples in retrieval order
pub fn format_ner_examples(examples: &[NerExample]) -> String {
    examples
        .iter()
        .map(|e| format!("ner: {}\nner info:{}\n", e.entity, e.comment))
        .collect()
}

/// Format agent decomposition examples in retrieval order
pub fn format_agent_examples(examples: &[AgentExample]) -> String {
    examples
        .iter()
        .map(|e| format!("query: {}\ntrain of thought:{}\n", e.query, e.comment))
        .collect()
}
