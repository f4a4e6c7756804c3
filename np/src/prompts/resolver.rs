//! Prompt resolution
//!
//! One entry point for every task category. The category's [`TaskSpec`]
//! decides which parameters are required and which derived blocks (schema,
//! dialect, examples, guidance) are filled in before substitution.

use std::collections::BTreeMap;
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::alias::ModelAliases;
use super::embedded::AGENT_COT_EXAMPLE;
use super::loader::TemplateCatalog;
use super::registry::{TemplateRegistry, placeholders};
use super::schema::render_schema;
use crate::config::Config;
use crate::domain::{
    AgentExample, Dialect, DialectStep, NerExample, SchemaDescriptor, SqlExample, TaskCategory, TaskSpec,
    format_agent_examples, format_ner_examples, format_sql_examples,
};
use crate::error::PromptError;

/// Named parameters for one render call
#[derive(Debug, Clone, Default)]
pub struct PromptParams {
    /// Plain text parameters such as `question`, `chat_history`, `data`, `sql`
    pub values: BTreeMap<String, String>,
    pub schema: SchemaDescriptor,
    pub sql_examples: Vec<SqlExample>,
    pub ner_examples: Vec<NerExample>,
    pub agent_examples: Vec<AgentExample>,
    /// Dialect name; the resolver default applies when absent
    pub dialect: Option<String>,
}

impl PromptParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(question: impl Into<String>) -> Self {
        Self::new().with_value("question", question)
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_sql_examples(mut self, examples: Vec<SqlExample>) -> Self {
        self.sql_examples = examples;
        self
    }

    pub fn with_ner_examples(mut self, examples: Vec<NerExample>) -> Self {
        self.ner_examples = examples;
        self
    }

    pub fn with_agent_examples(mut self, examples: Vec<AgentExample>) -> Self {
        self.agent_examples = examples;
        self
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A rendered system/user prompt pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPrompt {
    pub user: String,
    pub system: String,
}

/// Renders prompts from a shared alias table and registry
#[derive(Debug, Clone)]
pub struct PromptResolver {
    aliases: Arc<ModelAliases>,
    registry: Arc<TemplateRegistry>,
    hbs: Handlebars<'static>,
    default_dialect: String,
}

impl PromptResolver {
    pub fn new(aliases: Arc<ModelAliases>, registry: Arc<TemplateRegistry>) -> Self {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        Self {
            aliases,
            registry,
            hbs,
            default_dialect: "mysql".to_string(),
        }
    }

    /// Resolver over a loaded catalog
    pub fn from_catalog(catalog: TemplateCatalog) -> Self {
        Self::new(Arc::new(catalog.aliases), Arc::new(catalog.registry))
    }

    /// Load the catalog the configuration describes and build a resolver over it
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let catalog = TemplateCatalog::load(config)?;
        Ok(Self::from_catalog(catalog).with_default_dialect(&config.default_dialect))
    }

    pub fn with_default_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.default_dialect = dialect.into();
        self
    }

    pub fn aliases(&self) -> &ModelAliases {
        &self.aliases
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Render the system and user prompts for a task
    pub fn render(&self, task: TaskCategory, model_id: &str, params: &PromptParams) -> Result<RenderedPrompt, PromptError> {
        debug!(%task, %model_id, "render: called");
        let model_key = self.aliases.alias_for(model_id)?;
        let pair = self.registry.template_pair(task, model_key)?;
        let context = self.build_context(task, task.spec(), model_key, params)?;

        let rendered = RenderedPrompt {
            system: self.fill(task, pair.system, &context)?,
            user: self.fill(task, pair.user, &context)?,
        };
        debug!(%task, %model_key, user_len = rendered.user.len(), "render: complete");
        Ok(rendered)
    }

    fn build_context(
        &self,
        task: TaskCategory,
        spec: &TaskSpec,
        model_key: &str,
        params: &PromptParams,
    ) -> Result<BTreeMap<&'static str, String>, PromptError> {
        let mut context = BTreeMap::new();

        for key in spec.required {
            let value = params.value(key).ok_or_else(|| PromptError::PromptRender {
                category: task,
                placeholder: key.to_string(),
            })?;
            context.insert(*key, value.to_string());
        }
        for key in spec.optional {
            context.insert(*key, params.value(key).unwrap_or_default().to_string());
        }

        if let Some(slot) = spec.schema_slot {
            context.insert(slot, render_schema(&params.schema, model_key, &self.registry)?);
        }

        let dialect_name = params.dialect.as_deref().unwrap_or(&self.default_dialect);
        match spec.dialect {
            DialectStep::None => {}
            DialectStep::Preamble => {
                let dialect = Dialect::parse(dialect_name);
                debug!(%dialect, "build_context: dialect preamble");
                context.insert("dialect_prompt", dialect.preamble().to_string());
                context.insert("dialect", dialect.display_name(dialect_name).to_string());
            }
            DialectStep::EngineName => {
                context.insert("database_engine", dialect_name.to_string());
            }
        }

        if let Some(slot) = spec.sql_examples_slot {
            context.insert(slot, format_sql_examples(&params.sql_examples));
        }
        if let Some(slot) = spec.ner_examples_slot {
            context.insert(slot, format_ner_examples(&params.ner_examples));
        }
        if let Some(slot) = spec.agent_examples_slot {
            let text = if params.agent_examples.is_empty() {
                AGENT_COT_EXAMPLE.to_string()
            } else {
                format_agent_examples(&params.agent_examples)
            };
            context.insert(slot, text);
        }
        if let Some(slot) = spec.guidance_slot {
            context.insert(slot, self.registry.guidance(model_key).unwrap_or_default().to_string());
        }

        Ok(context)
    }

    /// Substitute a template, refusing placeholders the context does not carry
    fn fill(&self, task: TaskCategory, template: &str, context: &BTreeMap<&'static str, String>) -> Result<String, PromptError> {
        if let Some(missing) = placeholders(template)
            .into_iter()
            .find(|name| !context.contains_key(name.as_str()))
        {
            return Err(PromptError::PromptRender {
                category: task,
                placeholder: missing,
            });
        }
        Ok(self.hbs.render_template(template, context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::registry::Role;
    use proptest::prelude::*;

    const HAIKU_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

    fn resolver() -> PromptResolver {
        PromptResolver::from_catalog(TemplateCatalog::builtin().unwrap())
    }

    fn small_resolver(category: TaskCategory, system: &str, user: &str) -> PromptResolver {
        let mut aliases = ModelAliases::new();
        aliases.register("test-model", "m");
        let mut builder = TemplateRegistry::builder();
        builder
            .register(category, "m", Role::System, system)
            .register(category, "m", Role::User, user)
            .register_fallback_schema("m", "fallback_table: demo\nid INT\n");
        PromptResolver::new(Arc::new(aliases), Arc::new(builder.build()))
    }

    #[test]
    fn test_intent_render() {
        let rendered = resolver()
            .render(TaskCategory::Intent, HAIKU_ID, &PromptParams::question("6月份酒店的订单为什么下降了"))
            .unwrap();
        assert!(rendered.user.contains("6月份酒店的订单为什么下降了"));
        assert!(!rendered.user.contains("{{"));
        assert!(rendered.system.contains("normal_search"));
    }

    #[test]
    fn test_unknown_model() {
        let err = resolver()
            .render(TaskCategory::Intent, "openai.gpt-4", &PromptParams::question("hi"))
            .unwrap_err();
        assert!(matches!(err, PromptError::UnknownModel { .. }));
    }

    #[test]
    fn test_missing_required_names_key() {
        let params = PromptParams::question("亚洲呢");
        let err = resolver()
            .render(TaskCategory::QueryRewrite, HAIKU_ID, &params)
            .unwrap_err();
        assert_eq!(err.placeholder(), Some("chat_history"));
    }

    #[test]
    fn test_text2sql_dialects() {
        let resolver = resolver();
        let params = PromptParams::question("top hotels").with_dialect("redshift");
        let rendered = resolver.render(TaskCategory::Text2Sql, HAIKU_ID, &params).unwrap();
        assert!(rendered.system.contains("Amazon Redshift"));
        assert!(rendered.user.contains(Dialect::Redshift.preamble()));

        let params = PromptParams::question("top hotels").with_dialect("sqlite");
        let rendered = resolver.render(TaskCategory::Text2Sql, HAIKU_ID, &params).unwrap();
        assert!(rendered.system.contains("sqlite"));
        assert!(rendered.user.contains(Dialect::Default.preamble()));
    }

    #[test]
    fn test_text2sql_default_dialect() {
        let rendered = resolver()
            .render(TaskCategory::Text2Sql, HAIKU_ID, &PromptParams::question("q"))
            .unwrap();
        assert!(rendered.system.contains("MySQL"));

        let rendered = resolver()
            .with_default_dialect("clickhouse")
            .render(TaskCategory::Text2Sql, HAIKU_ID, &PromptParams::question("q"))
            .unwrap();
        assert!(rendered.system.contains("ClickHouse"));
    }

    #[test]
    fn test_text2sql_blocks() {
        let schema = SchemaDescriptor::new().with_table("orders", "订单表", "order_id INT");
        let params = PromptParams::question("how many orders")
            .with_schema(schema)
            .with_sql_examples(vec![SqlExample::new("count orders", "SELECT COUNT(*) FROM orders")])
            .with_ner_examples(vec![NerExample::new("希尔顿", "hotel_name = 'Hilton'")]);
        let rendered = resolver().render(TaskCategory::Text2Sql, HAIKU_ID, &params).unwrap();
        assert!(rendered.user.contains("orders: 订单表\norder_id INT\n\n"));
        assert!(rendered.user.contains("Q: count orders\nA: ```sql\nSELECT COUNT(*) FROM orders```\n"));
        assert!(rendered.user.contains("ner: 希尔顿\nner info:hotel_name = 'Hilton'\n"));
        assert!(rendered.user.contains("Never write INSERT"));
        assert!(!rendered.user.contains("hotel_orders"));
    }

    #[test]
    fn test_empty_schema_uses_fallback() {
        let rendered = resolver()
            .render(TaskCategory::Text2Sql, HAIKU_ID, &PromptParams::question("q"))
            .unwrap();
        assert!(rendered.user.contains("hotel_orders"));
    }

    #[test]
    fn test_agent_defaults() {
        let rendered = resolver()
            .render(TaskCategory::Agent, HAIKU_ID, &PromptParams::question("为什么下降了"))
            .unwrap();
        assert!(rendered.system.contains(AGENT_COT_EXAMPLE));
        assert!(rendered.user.contains("为什么下降了"));

        let params = PromptParams::question("q").with_agent_examples(vec![AgentExample::new("why", "{\"task_1\": \"a\"}")]);
        let rendered = resolver().render(TaskCategory::Agent, HAIKU_ID, &params).unwrap();
        assert!(rendered.system.contains("query: why\ntrain of thought:{\"task_1\": \"a\"}\n"));
        assert!(!rendered.system.contains(AGENT_COT_EXAMPLE));
    }

    #[test]
    fn test_superset_and_optimization_use_engine_name() {
        let resolver = resolver();
        let params = PromptParams::question("chart it")
            .with_value("dataset_schema", "1__table: orders")
            .with_dialect("redshift");
        let rendered = resolver.render(TaskCategory::SupersetChart, HAIKU_ID, &params).unwrap();
        assert!(rendered.user.contains("database engine is redshift"));
        assert!(rendered.user.contains("1__table: orders"));

        let params = PromptParams::new().with_value("sql", "SELECT 1").with_dialect("starrocks");
        let rendered = resolver.render(TaskCategory::SqlOptimization, HAIKU_ID, &params).unwrap();
        assert!(rendered.system.contains("proficient in starrocks"));
        assert!(rendered.user.contains("```SELECT 1```"));
    }

    #[test]
    fn test_every_builtin_category_renders() {
        let resolver = resolver();
        let params = PromptParams::question("q")
            .with_value("chat_history", "user: hi")
            .with_value("data", "[]")
            .with_value("dataset_schema", "ds")
            .with_value("sql", "SELECT 1");
        for (model_id, _) in resolver.aliases().iter() {
            for category in TaskCategory::ALL {
                let rendered = resolver.render(category, model_id, &params).unwrap();
                assert!(!rendered.user.contains("{{"), "{} {}", category, model_id);
                assert!(!rendered.system.contains("{{"), "{} {}", category, model_id);
            }
        }
    }

    #[test]
    fn test_values_are_not_reinterpreted() {
        let params = PromptParams::question("{{sql_schema}} & <b>");
        let rendered = resolver().render(TaskCategory::Intent, HAIKU_ID, &params).unwrap();
        assert!(rendered.user.contains("{{sql_schema}} & <b>"));
    }

    #[test]
    fn test_orphan_placeholder_is_render_error() {
        let resolver = small_resolver(TaskCategory::Intent, "sys", "{{question}} {{sql_schema}}");
        let err = resolver
            .render(TaskCategory::Intent, "test-model", &PromptParams::question("q"))
            .unwrap_err();
        assert_eq!(err.placeholder(), Some("sql_schema"));
    }

    #[test]
    fn test_trimmed_placeholder_is_render_error() {
        let resolver = small_resolver(TaskCategory::Intent, "sys", "{{~chat_history~}} {{question}}");
        let err = resolver
            .render(TaskCategory::Intent, "test-model", &PromptParams::question("q"))
            .unwrap_err();
        assert!(matches!(err, PromptError::PromptRender { .. }));
        assert_eq!(err.placeholder(), Some("chat_history"));

        let resolver = small_resolver(TaskCategory::Intent, "sys", "{{question}} {{chat_history.last}}");
        let err = resolver
            .render(TaskCategory::Intent, "test-model", &PromptParams::question("q"))
            .unwrap_err();
        assert_eq!(err.placeholder(), Some("chat_history"));
    }

    #[test]
    fn test_agent_guidance_is_optional() {
        let resolver = small_resolver(TaskCategory::Agent, "[{{sql_guidance}}] {{table_schema_data}}", "{{question}}");
        let rendered = resolver
            .render(TaskCategory::Agent, "test-model", &PromptParams::question("q"))
            .unwrap();
        assert!(rendered.system.starts_with("[] fallback_table"));

        let params = PromptParams::question("q").with_value("sql_guidance", "use LIMIT");
        let rendered = resolver.render(TaskCategory::Agent, "test-model", &params).unwrap();
        assert!(rendered.system.starts_with("[use LIMIT]"));
    }

    proptest! {
        #[test]
        fn prop_render_is_deterministic(
            question in "\\PC{0,40}",
            tables in proptest::collection::vec(("[a-z_]{1,10}", "\\PC{0,20}", "\\PC{0,20}"), 0..5),
            dialect in "[a-z]{0,12}",
        ) {
            let resolver = resolver();
            let mut schema = SchemaDescriptor::new();
            for (name, description, ddl) in tables {
                schema = schema.with_table(name, description, ddl);
            }
            let params = PromptParams::question(question).with_schema(schema).with_dialect(dialect);
            let first = resolver.render(TaskCategory::Text2Sql, HAIKU_ID, &params).unwrap();
            let second = resolver.render(TaskCategory::Text2Sql, HAIKU_ID, &params).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
