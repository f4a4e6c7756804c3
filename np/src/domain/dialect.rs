//! SQL dialects and their prompt preambles

use serde::{Deserialize, Serialize};

/// Supported SQL dialects
///
/// Parsing never fails: anything unrecognized becomes [`Dialect::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgresql,
    Mysql,
    Redshift,
    Starrocks,
    Clickhouse,
    #[default]
    Default,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::Postgresql,
        Dialect::Mysql,
        Dialect::Redshift,
        Dialect::Starrocks,
        Dialect::Clickhouse,
        Dialect::Default,
    ];

    /// Map a dialect name onto a dialect, falling back to `Default`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "postgresql" | "postgres" => Self::Postgresql,
            "mysql" => Self::Mysql,
            "redshift" => Self::Redshift,
            "starrocks" => Self::Starrocks,
            "clickhouse" => Self::Clickhouse,
            _ => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Redshift => "redshift",
            Self::Starrocks => "starrocks",
            Self::Clickhouse => "clickhouse",
            Self::Default => "default",
        }
    }

    /// Engine name as shown to the model
    ///
    /// `Default` has no engine of its own, so the name the caller gave is kept.
    pub fn display_name<'a>(&self, given: &'a str) -> &'a str {
        match self {
            Self::Postgresql => "PostgreSQL",
            Self::Mysql => "MySQL",
            Self::Redshift => "Amazon Redshift",
            Self::Starrocks => "StarRocks",
            Self::Clickhouse => "ClickHouse",
            Self::Default if given.trim().is_empty() || given.trim().eq_ignore_ascii_case("default") => "SQL",
            Self::Default => given,
        }
    }

    /// Dialect-specific guidance inserted into the SQL generation prompt
    pub fn preamble(&self) -> &'static str {
        match self {
            Self::Postgresql => POSTGRES_PREAMBLE,
            Self::Mysql => MYSQL_PREAMBLE,
            Self::Redshift => REDSHIFT_PREAMBLE,
            Self::Starrocks => STARROCKS_PREAMBLE,
            Self::Clickhouse => CLICKHOUSE_PREAMBLE,
            Self::Default => DEFAULT_PREAMBLE,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const POSTGRES_PREAMBLE: &str = r#"You are a PostgreSQL expert. Given an input question, first create a syntactically correct PostgreSQL query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most 100 results using the LIMIT clause as per PostgreSQL.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in double quotes (") to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use CURRENT_DATE function to get the current date, if the question involves "today"."#;

const MYSQL_PREAMBLE: &str = r#"You are a MySQL expert. Given an input question, first create a syntactically correct MySQL query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most 100 results using the LIMIT clause as per MySQL.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in backticks (`) to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use CURDATE() function to get the current date, if the question involves "today"."#;

const REDSHIFT_PREAMBLE: &str = r#"You are an Amazon Redshift expert. Given an input question, first create a syntactically correct Redshift query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most 100 results using the LIMIT clause as per Redshift.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in double quotes (") to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use GETDATE() or CURRENT_DATE to get the current date, if the question involves "today". Use DATEADD and DATEDIFF for date arithmetic."#;

const STARROCKS_PREAMBLE: &str = r#"You are a StarRocks expert. Given an input question, first create a syntactically correct StarRocks query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most 100 results using the LIMIT clause as per StarRocks.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in backticks (`) to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use CURDATE() function to get the current date, if the question involves "today". StarRocks is MySQL-compatible, but prefer its date_trunc function for time bucketing."#;

const CLICKHOUSE_PREAMBLE: &str = r#"You are a ClickHouse expert. Given an input question, first create a syntactically correct ClickHouse query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most 100 results using the LIMIT clause as per ClickHouse.
Never query for all columns from a table. You must query only the columns that are needed to answer the question. Wrap each column name in backticks (`) to denote them as delimited identifiers.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table.
Pay attention to use today() function to get the current date, if the question involves "today". Use toStartOfMonth and related functions for time bucketing."#;

const DEFAULT_PREAMBLE: &str = r#"You are a SQL expert. Given an input question, first create a syntactically correct SQL query to run, then look at the results of the query and return the answer to the input question.
Unless the user specifies in the question a specific number of examples to obtain, query for at most 100 results using the LIMIT clause.
Never query for all columns from a table. You must query only the columns that are needed to answer the question.
Pay attention to use only the column names you can see in the tables below. Be careful to not query for columns that do not exist. Also, pay attention to which column is in which table."#;
