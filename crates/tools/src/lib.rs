//! Tool configuration for the brand-management domain.
//!
//! Each module wires one resource family onto the generic engine: entity
//! configs (scoping, defaults, patch rules, projections, list allow-lists,
//! cascade rules) plus the few bespoke executors that go beyond plain CRUD
//! (content block text, SEO metrics fetch).

use std::sync::Arc;

use toolkit::{PropertySpec, RegistryError, ToolRegistry, ToolRuntime};

pub mod brand;
pub mod ci;
pub mod content;
pub mod kanban;
pub mod market;
pub mod seo;
pub mod social;

pub use seo::{KeywordMetrics, MetricsProvider, ProviderError};

/// Build the full tool table over one shared runtime.
pub fn build_registry(
    runtime: &Arc<ToolRuntime>,
    metrics: Arc<dyn MetricsProvider>,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    brand::register(&mut registry, runtime)?;
    ci::register(&mut registry, runtime)?;
    content::register(&mut registry, runtime)?;
    kanban::register(&mut registry, runtime)?;
    market::register(&mut registry, runtime)?;
    seo::register(&mut registry, runtime, metrics)?;
    social::register(&mut registry, runtime)?;
    Ok(registry)
}

/// Standard pagination/sort/search properties appended to every list schema.
pub(crate) fn list_properties(
    sortable: &'static [&'static str],
    mut properties: Vec<PropertySpec>,
) -> Vec<PropertySpec> {
    properties.push(PropertySpec::integer(
        "limit",
        "Maximum rows to return; capped server-side",
    ));
    properties.push(PropertySpec::integer("offset", "Rows to skip"));
    properties.push(PropertySpec::enumerated("sort", "Sort field", sortable));
    properties.push(PropertySpec::enumerated(
        "direction",
        "Sort direction",
        &["asc", "desc"],
    ));
    properties.push(PropertySpec::string("search", "Free-text search term"));
    properties
}

#[cfg(test)]
pub(crate) mod support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{Map, Value, json};

    use db::MemoryStore;
    use toolkit::{
        AuthorizationGate, InvocationContext, NoopInvalidator, Principal, TeamScopedGate,
        ToolRegistry, ToolReply, ToolRuntime, ToolkitConfig,
    };

    use crate::seo::{KeywordMetrics, MetricsProvider, ProviderError};

    pub struct StubMetrics;

    #[async_trait]
    impl MetricsProvider for StubMetrics {
        fn provider_name(&self) -> &str {
            "dataforseo"
        }

        fn cost_cents(&self) -> i64 {
            5
        }

        async fn keyword_metrics(&self, _term: &str) -> Result<KeywordMetrics, ProviderError> {
            Ok(KeywordMetrics {
                search_volume: 1200,
                cpc_cents: 87,
            })
        }
    }

    pub fn runtime_with_gate(gate: Arc<dyn AuthorizationGate>) -> Arc<ToolRuntime> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        ToolRuntime::new(
            Arc::new(MemoryStore::new()),
            gate,
            Arc::new(NoopInvalidator),
            ToolkitConfig::default(),
        )
    }

    pub fn runtime() -> Arc<ToolRuntime> {
        runtime_with_gate(Arc::new(TeamScopedGate::new()))
    }

    pub fn registry(runtime: &Arc<ToolRuntime>) -> ToolRegistry {
        crate::build_registry(runtime, Arc::new(StubMetrics)).unwrap()
    }

    pub fn ctx(user_id: i64, team_id: i64) -> InvocationContext {
        InvocationContext::new(
            Principal {
                id: user_id,
                team_id: Some(team_id),
                name: format!("user-{user_id}"),
            },
            Some(team_id),
        )
    }

    pub async fn call(
        registry: &ToolRegistry,
        name: &str,
        ctx: &InvocationContext,
        args: Value,
    ) -> ToolReply {
        let Value::Object(map) = args else {
            panic!("test args must be a JSON object");
        };
        registry.dispatch(name, map, ctx).await
    }

    /// Dispatch and unwrap the success payload, panicking with the error
    /// message otherwise.
    pub async fn call_ok(
        registry: &ToolRegistry,
        name: &str,
        ctx: &InvocationContext,
        args: Value,
    ) -> Map<String, Value> {
        let reply = call(registry, name, ctx, args).await;
        match reply {
            ToolReply::Ok { data, .. } => data,
            ToolReply::Error { code, message } => panic!("{name} failed: {code}: {message}"),
        }
    }

    pub async fn seed_brand(
        registry: &ToolRegistry,
        ctx: &InvocationContext,
        name: &str,
    ) -> i64 {
        let data = call_ok(registry, "brand.brands.POST", ctx, json!({ "name": name })).await;
        data["id"].as_i64().unwrap()
    }
}
