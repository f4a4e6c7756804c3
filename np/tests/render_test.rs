//! End-to-end prompt rendering over the builtin catalog

use std::sync::Arc;

use nlqprompt::config::Config;
use nlqprompt::prompts::{ModelAliases, RegistryBuilder};
use nlqprompt::{
    NerExample, PromptError, PromptParams, PromptResolver, Role, SchemaDescriptor, SqlExample, TaskCategory,
    TemplateCatalog,
};

const HAIKU: &str = "anthropic.claude-3-haiku-20240307-v1:0";
const SONNET_35: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

fn builtin_resolver() -> PromptResolver {
    PromptResolver::from_catalog(TemplateCatalog::builtin().expect("builtin catalog loads"))
}

// =============================================================================
// Catalog
// =============================================================================

#[test]
fn test_builtin_registry_has_no_orphan_placeholders() {
    let catalog = TemplateCatalog::builtin().unwrap();
    let orphans = catalog.registry.orphan_placeholders();
    assert!(orphans.is_empty(), "orphan placeholders: {:?}", orphans);
}

#[test]
fn test_builtin_aliases_resolve() {
    let resolver = builtin_resolver();
    assert_eq!(resolver.aliases().alias_for(HAIKU).unwrap(), "haiku-20240307v1-0");
    assert_eq!(resolver.aliases().alias_for(SONNET_35).unwrap(), "sonnet-3-5-20240620v1-0");
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_intent_question_is_substituted() {
    let rendered = builtin_resolver()
        .render(TaskCategory::Intent, HAIKU, &PromptParams::question("6月份酒店的订单为什么下降了"))
        .unwrap();
    assert!(rendered.user.contains("6月份酒店的订单为什么下降了"));
    assert!(!rendered.user.contains("{{question}}"));
    assert!(!rendered.user.contains("{question}"));
}

#[test]
fn test_redshift_system_prompt_names_engine() {
    let params = PromptParams::question("上个月销量最高的酒店").with_dialect("redshift");
    let rendered = builtin_resolver().render(TaskCategory::Text2Sql, HAIKU, &params).unwrap();
    assert!(rendered.system.contains("Amazon Redshift"));
    assert!(!rendered.system.contains("proficient in redshift"));
}

#[test]
fn test_text2sql_full_request() {
    let schema: SchemaDescriptor = serde_json::from_str(
        r#"{
            "orders": {"tbl_a": "酒店订单表", "col_a": "order_id INT, hotel_id INT, amount DECIMAL"},
            "hotels": {"description": "酒店维表", "ddl": "hotel_id INT, hotel_name VARCHAR"}
        }"#,
    )
    .unwrap();
    let sql_examples: Vec<SqlExample> = serde_json::from_str(
        r#"[{"_source": {"text": "订单总数", "sql": "SELECT COUNT(*) FROM orders"}}]"#,
    )
    .unwrap();
    let ner_examples: Vec<NerExample> =
        serde_json::from_str(r#"[{"entity": "希尔顿", "comment": "hotel_name = 'Hilton'"}]"#).unwrap();

    let params = PromptParams::question("希尔顿的订单总额")
        .with_schema(schema)
        .with_sql_examples(sql_examples)
        .with_ner_examples(ner_examples)
        .with_dialect("postgresql");
    let rendered = builtin_resolver().render(TaskCategory::Text2Sql, SONNET_35, &params).unwrap();

    let orders = rendered.user.find("orders: 酒店订单表").unwrap();
    let hotels = rendered.user.find("hotels: 酒店维表").unwrap();
    assert!(orders < hotels);
    assert!(rendered.user.contains("Q: 订单总数\nA: ```sql\nSELECT COUNT(*) FROM orders```\n"));
    assert!(rendered.user.contains("ner: 希尔顿\nner info:hotel_name = 'Hilton'\n"));
    assert!(rendered.user.contains("PostgreSQL expert"));
    assert!(rendered.user.ends_with("The question is : 希尔顿的订单总额\n"));
    assert!(rendered.system.contains("PostgreSQL"));
}

#[test]
fn test_empty_schema_renders_fallback() {
    let rendered = builtin_resolver()
        .render(TaskCategory::Text2Sql, HAIKU, &PromptParams::question("q"))
        .unwrap();
    let start = rendered.user.find("<table_schema>").unwrap();
    let end = rendered.user.find("</table_schema>").unwrap();
    assert!(!rendered.user[start + "<table_schema>".len()..end].trim().is_empty());
}

#[test]
fn test_render_twice_is_identical() {
    let resolver = builtin_resolver();
    let params = PromptParams::question("q")
        .with_schema(SchemaDescriptor::new().with_table("b", "second", "x INT").with_table("a", "first", "y INT"))
        .with_dialect("starrocks");
    let first = resolver.render(TaskCategory::Text2Sql, HAIKU, &params).unwrap();
    let second = resolver.render(TaskCategory::Text2Sql, HAIKU, &params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_query_rewrite_requires_history() {
    let err = builtin_resolver()
        .render(TaskCategory::QueryRewrite, HAIKU, &PromptParams::question("亚洲呢"))
        .unwrap_err();
    assert!(matches!(err, PromptError::PromptRender { ref placeholder, .. } if placeholder == "chat_history"));

    let params = PromptParams::question("亚洲呢").with_value("chat_history", "user: 上个月欧洲的销量\n");
    let rendered = builtin_resolver().render(TaskCategory::QueryRewrite, HAIKU, &params).unwrap();
    assert!(rendered.user.contains("user: 上个月欧洲的销量"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_model_id() {
    let err = builtin_resolver()
        .render(TaskCategory::Intent, "haiku-20240307v1-0", &PromptParams::question("q"))
        .unwrap_err();
    assert!(matches!(err, PromptError::UnknownModel { .. }));
}

#[test]
fn test_self_hosted_model_has_partial_catalog() {
    let mut config = Config::default();
    config.templates.paths = vec!["builtin".to_string()];
    config.self_hosted.mode = "self-hosted".to_string();
    config.self_hosted.model_id = "sagemaker-qwen-72b".to_string();
    config.self_hosted.model_name = "qwen-72b".to_string();
    let resolver = PromptResolver::from_config(&config).unwrap();

    let params = PromptParams::question("q").with_value("data", "[[\"n\"], [1]]");
    let rendered = resolver.render(TaskCategory::DataSummary, "sagemaker-qwen-72b", &params).unwrap();
    assert!(rendered.user.contains("[[\"n\"], [1]]"));

    let err = resolver
        .render(TaskCategory::Text2Sql, "sagemaker-qwen-72b", &params)
        .unwrap_err();
    match err {
        PromptError::TemplateNotFound { category, model_key, .. } => {
            assert_eq!(category, TaskCategory::Text2Sql);
            assert_eq!(model_key, "qwen-72b");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Builtin models are unaffected
    assert!(resolver.render(TaskCategory::DataSummary, HAIKU, &params).is_ok());
}

#[test]
fn test_missing_fallback_schema() {
    let mut aliases = ModelAliases::new();
    aliases.register("bare-model", "bare");
    let mut builder = RegistryBuilder::new();
    builder
        .register(TaskCategory::Text2Sql, "bare", Role::System, "{{dialect}}")
        .register(TaskCategory::Text2Sql, "bare", Role::User, "{{sql_schema}} {{question}}");
    let resolver = PromptResolver::new(Arc::new(aliases), Arc::new(builder.build()));

    let err = resolver
        .render(TaskCategory::Text2Sql, "bare-model", &PromptParams::question("q"))
        .unwrap_err();
    assert!(matches!(err, PromptError::MissingFallbackSchema { .. }));
    assert!(err.is_configuration());
}
