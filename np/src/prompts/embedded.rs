//! Embedded template catalog
//!
//! These are compiled into the binary and registered for every builtin model key.

/// Builtin template documents, one per task category
pub const BUILTIN_DOCUMENTS: [(&str, &str); 11] = [
    ("text2sql", include_str!("builtin/text2sql.yml")),
    ("intent", include_str!("builtin/intent.yml")),
    ("query_rewrite", include_str!("builtin/query_rewrite.yml")),
    ("knowledge", include_str!("builtin/knowledge.yml")),
    ("agent", include_str!("builtin/agent.yml")),
    ("agent_analyse", include_str!("builtin/agent_analyse.yml")),
    ("data_summary", include_str!("builtin/data_summary.yml")),
    ("data_visualization", include_str!("builtin/data_visualization.yml")),
    ("suggestion", include_str!("builtin/suggestion.yml")),
    ("superset_chart", include_str!("builtin/superset_chart.yml")),
    ("sql_optimization", include_str!("builtin/sql_optimization.yml")),
];

/// Template documents for a self-hosted model endpoint
pub const SELF_HOSTED_DOCUMENTS: [(&str, &str); 3] = [
    ("data_summary", include_str!("builtin/self_hosted/data_summary.yml")),
    ("data_visualization", include_str!("builtin/self_hosted/data_visualization.yml")),
    ("agent_analyse", include_str!("builtin/self_hosted/agent_analyse.yml")),
];

/// Schema text used when a request carries no tables
pub const DEFAULT_SCHEMA: &str = r#"hotel_orders: hotel booking orders, one row per order
CREATE TABLE hotel_orders (
  order_id BIGINT COMMENT 'order id',
  hotel_name VARCHAR(128) COMMENT 'hotel name',
  region VARCHAR(32) COMMENT 'region such as Europe or Asia',
  order_date DATE COMMENT 'date the order was placed',
  nights INT COMMENT 'number of nights booked',
  amount DECIMAL(12, 2) COMMENT 'order amount'
);

"#;

/// SQL-writing guidance shared by the builtin models
pub const SQL_GUIDANCE: &str = r#"- Think through the question step by step before writing SQL.
- Only use tables and columns that appear in the schema.
- Never use columns that do not exist; prefer the column comments to match business terms.
- Use ORDER BY and LIMIT for ranking questions such as "top 10".
- When no time range is given, do not invent one.
- Alias aggregated columns with readable names.
- Never write INSERT, UPDATE, DELETE or DDL statements."#;

/// Chain-of-thought examples used when agent decomposition gets none
pub const AGENT_COT_EXAMPLE: &str = r#"query: 6月份酒店的订单为什么下降了
train of thought:
{
    "task_1": "查询5月份和6月份各区域酒店的订单量",
    "task_2": "查询5月份和6月份各酒店品牌的订单量",
    "task_3": "查询5月份和6月份订单的平均入住晚数"
}
query: 为什么上个月欧洲的销售额增长了
train of thought:
{
    "task_1": "查询上个月和上上个月欧洲各国家的销售额",
    "task_2": "查询上个月和上上个月欧洲的订单量和平均订单金额"
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_named_after_category() {
        for (name, doc) in BUILTIN_DOCUMENTS.iter().chain(SELF_HOSTED_DOCUMENTS.iter()) {
            assert!(doc.starts_with(&format!("category: {}\n", name)), "{} has wrong category", name);
        }
    }

    #[test]
    fn test_fallback_texts_have_no_placeholders() {
        for text in [DEFAULT_SCHEMA, SQL_GUIDANCE, AGENT_COT_EXAMPLE] {
            assert!(!text.trim().is_empty());
            assert!(!text.contains("{{"));
        }
    }
}
