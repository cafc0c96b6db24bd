//! SEO tools (`seo.*`).
//!
//! Clusters and keywords are plain CRUD; fetching keyword metrics is a
//! bespoke executor because it charges the brand's budget ledger, calls the
//! external provider and persists three rows in one atomic batch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use db::models::{ApiCostLog, SeoBudget, SeoCluster, SeoKeyword};
use toolkit::{
    Action, AuthRule, AuthSubject, CascadeRule, ChildCount, CrudTool, CrudVerb, DomainEntity,
    EntityConfig, InvocationContext, ListRules, Mutation, ParentLink, PropertySpec, RegistryError,
    SharedTool, Tool, ToolDescriptor, ToolError, ToolMetadata, ToolName, ToolRegistry, ToolReply,
    ToolRuntime, ToolSchema, invalidate_best_effort, row_map, to_row, validate,
};

use crate::list_properties;

const CLUSTER_SORTABLE: &[&str] = &["order", "name", "created_at"];
const KEYWORD_SORTABLE: &[&str] = &["order", "term", "search_volume"];

/// Metrics returned by the external keyword-data provider.
#[derive(Debug, Clone, Copy)]
pub struct KeywordMetrics {
    pub search_volume: i64,
    pub cpc_cents: i64,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// External keyword-data provider seam. Lookups cost real money; the cost is
/// declared up front so the budget check can run before the request.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    fn provider_name(&self) -> &str;
    fn cost_cents(&self) -> i64;
    async fn keyword_metrics(&self, term: &str) -> Result<KeywordMetrics, ProviderError>;
}

fn cluster_config() -> Result<Arc<EntityConfig<SeoCluster>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |cluster| cluster.name.clone(),
        parent: Some(ParentLink {
            kind: "brand",
            label: "Brand",
            field: "brand_id",
            parent_id: |cluster| cluster.brand_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::SelfSubject,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(SeoCluster {
                id: seed.id,
                uuid: seed.uuid,
                brand_id: args.require_i64("brand_id")?,
                team_id: seed.team_id.ok_or_else(|| {
                    ToolError::Execution("Parent brand row is missing its team.".to_string())
                })?,
                name: args.require_str("name")?.to_string(),
                color: args.string("color"),
                order: seed.order,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |cluster, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && cluster.name != name
            {
                cluster.name = name.to_string();
                changed = true;
            }
            if let Some(color) = args.str("color")
                && cluster.color.as_deref() != Some(color)
            {
                cluster.color = Some(color.to_string());
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && cluster.order != order
            {
                cluster.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |cluster, pctx| {
            let mut data = row_map(cluster)?;
            if let Some(brand_name) = pctx.parent_str("name") {
                data.insert("brand_name".into(), json!(brand_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["name"],
            sortable: CLUSTER_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[CascadeRule {
            kind: "seo_keyword",
            field: "seo_cluster_id",
            report_as: "keywords_deleted",
            children: &[],
        }],
        counts: &[ChildCount {
            kind: "seo_keyword",
            field: "seo_cluster_id",
            report_as: "keywords_count",
        }],
        list_op: Some(ToolName::parse("seo.clusters.GET")?),
    }))
}

fn keyword_config() -> Result<Arc<EntityConfig<SeoKeyword>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |keyword| keyword.term.clone(),
        parent: Some(ParentLink {
            kind: "seo_cluster",
            label: "SEO keyword cluster",
            field: "seo_cluster_id",
            parent_id: |keyword| keyword.seo_cluster_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::ViaParent,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(SeoKeyword {
                id: seed.id,
                uuid: seed.uuid,
                seo_cluster_id: args.require_i64("seo_cluster_id")?,
                term: args.require_str("term")?.to_string(),
                search_volume: None,
                cpc_cents: None,
                fetched_at: None,
                order: seed.order,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |keyword, args, _now| {
            let mut changed = false;
            if let Some(term) = args.str("term")
                && keyword.term != term
            {
                keyword.term = term.to_string();
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && keyword.order != order
            {
                keyword.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |keyword, pctx| {
            let mut data = row_map(keyword)?;
            if let Some(cluster_name) = pctx.parent_str("name") {
                data.insert("cluster_name".into(), json!(cluster_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["term"],
            sortable: KEYWORD_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[],
        counts: &[],
        list_op: Some(ToolName::parse("seo.keywords.GET")?),
    }))
}

/// `seo.keyword.FETCH_METRICS` — refresh a keyword's metrics from the
/// external provider.
///
/// The budget check runs before the provider call, and the keyword update,
/// the budget charge and the cost-log row land in one atomic batch. A failed
/// provider call charges nothing.
struct FetchKeywordMetricsTool {
    descriptor: ToolDescriptor,
    list_op: ToolName,
    runtime: Arc<ToolRuntime>,
    metrics: Arc<dyn MetricsProvider>,
}

impl FetchKeywordMetricsTool {
    fn shared(
        runtime: Arc<ToolRuntime>,
        metrics: Arc<dyn MetricsProvider>,
    ) -> Result<SharedTool, RegistryError> {
        Ok(Arc::new(FetchKeywordMetricsTool {
            descriptor: ToolDescriptor {
                name: ToolName::parse("seo.keyword.FETCH_METRICS")?,
                description: "Fetch search volume and CPC for a keyword from the metrics \
                              provider, charging the brand's SEO budget."
                    .to_string(),
                schema: ToolSchema::new(
                    vec![PropertySpec::integer("id", "Keyword to refresh")],
                    vec!["id"],
                ),
                metadata: ToolMetadata::write()
                    .with_side_effect("external_api")
                    .with_side_effect("budget_charge"),
            },
            list_op: ToolName::parse("seo.keywords.GET")?,
            runtime,
            metrics,
        }))
    }

    /// The brand's ledger row, or a fresh one at the default limit when the
    /// brand has never fetched before. `true` means the row is new.
    async fn budget_for(&self, brand_id: i64) -> Result<(SeoBudget, bool), ToolError> {
        let repo = self.runtime.repo();
        let mut existing: Vec<SeoBudget> = repo.matching("brand_id", &json!(brand_id)).await?;
        if let Some(budget) = existing.pop() {
            return Ok((budget, false));
        }
        let now = Utc::now();
        Ok((
            SeoBudget {
                id: repo.next_id::<SeoBudget>().await?,
                uuid: Uuid::new_v4(),
                brand_id,
                budget_limit_cents: SeoBudget::DEFAULT_LIMIT_CENTS,
                budget_spent_cents: 0,
                created_at: now,
                updated_at: now,
            },
            true,
        ))
    }

    async fn run(
        &self,
        args: Map<String, Value>,
        ctx: &InvocationContext,
    ) -> Result<ToolReply, ToolError> {
        let principal = ctx.principal()?.clone();
        let args = validate(&self.descriptor.schema, &args)?;
        let repo = self.runtime.repo();
        let mut keyword: SeoKeyword = repo.require(args.require_i64("id")?).await?;
        let cluster: SeoCluster = repo.require(keyword.seo_cluster_id).await?;
        let subject = AuthSubject {
            kind: SeoCluster::KIND,
            id: cluster.id,
            team_id: Some(cluster.team_id),
        };
        self.runtime
            .authorize(&principal, Action::Update, &subject)
            .await?;

        let (mut budget, budget_is_new) = self.budget_for(cluster.brand_id).await?;
        let cost = self.metrics.cost_cents();
        if !budget.covers(cost) {
            return Err(ToolError::BudgetExceeded(format!(
                "The SEO metrics budget is exhausted: {} of {} cents spent, {} more needed.",
                budget.budget_spent_cents, budget.budget_limit_cents, cost
            )));
        }

        let fetched = self
            .metrics
            .keyword_metrics(&keyword.term)
            .await
            .map_err(|err| {
                ToolError::Execution(format!("Metrics provider request failed: {err}"))
            })?;

        let now = Utc::now();
        keyword.search_volume = Some(fetched.search_volume);
        keyword.cpc_cents = Some(fetched.cpc_cents);
        keyword.fetched_at = Some(now);
        keyword.touch(now);
        budget.budget_spent_cents += cost;
        budget.touch(now);
        let cost_log = ApiCostLog {
            id: repo.next_id::<ApiCostLog>().await?,
            uuid: Uuid::new_v4(),
            brand_id: cluster.brand_id,
            provider: self.metrics.provider_name().to_string(),
            cost_cents: cost,
            created_at: now,
        };

        let budget_mutation = if budget_is_new {
            Mutation::Insert {
                kind: SeoBudget::KIND,
                id: budget.id,
                row: to_row(&budget)?,
            }
        } else {
            Mutation::Replace {
                kind: SeoBudget::KIND,
                id: budget.id,
                row: to_row(&budget)?,
            }
        };
        repo.apply(vec![
            Mutation::Replace {
                kind: SeoKeyword::KIND,
                id: keyword.id,
                row: to_row(&keyword)?,
            },
            budget_mutation,
            Mutation::Insert {
                kind: ApiCostLog::KIND,
                id: cost_log.id,
                row: to_row(&cost_log)?,
            },
        ])
        .await?;
        info!(
            tool = %self.descriptor.name,
            request_id = %ctx.request_id,
            keyword_id = keyword.id,
            provider = self.metrics.provider_name(),
            cost_cents = cost,
            "keyword metrics fetched"
        );
        invalidate_best_effort(
            self.runtime.cache.as_ref(),
            &self.list_op,
            principal.id,
            ctx.team_id,
        )
        .await;

        let mut data = row_map(&keyword)?;
        data.insert("cluster_name".into(), json!(cluster.name));
        data.insert("provider".into(), json!(self.metrics.provider_name()));
        data.insert("cost_cents".into(), json!(cost));
        data.insert(
            "budget_spent_cents".into(),
            json!(budget.budget_spent_cents),
        );
        data.insert(
            "budget_remaining_cents".into(),
            json!(budget.remaining_cents()),
        );
        Ok(ToolReply::ok(
            format!("Metrics for keyword '{}' were fetched.", keyword.term),
            data,
        ))
    }
}

#[async_trait]
impl Tool for FetchKeywordMetricsTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Map<String, Value>, ctx: &InvocationContext) -> ToolReply {
        match self.run(args, ctx).await {
            Ok(reply) => reply,
            Err(err) => {
                if matches!(err, ToolError::Execution(_)) {
                    error!(
                        tool = %self.descriptor.name,
                        request_id = %ctx.request_id,
                        error = %err,
                        "tool execution failed"
                    );
                }
                err.into()
            }
        }
    }
}

pub fn register(
    registry: &mut ToolRegistry,
    runtime: &Arc<ToolRuntime>,
    metrics: Arc<dyn MetricsProvider>,
) -> Result<(), RegistryError> {
    let cluster = cluster_config()?;
    let keyword = keyword_config()?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.clusters.POST")?,
            description: "POST /api/brands/{brand_id}/seo-clusters — create a keyword cluster."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("brand_id", "Owning brand"),
                    PropertySpec::string("name", "Cluster name"),
                    PropertySpec::string("color", "Optional display color"),
                ],
                vec!["brand_id", "name"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        cluster.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.cluster.GET")?,
            description: "GET /api/seo-clusters/{id} — fetch one cluster with keyword count."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Cluster id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        cluster.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.clusters.GET")?,
            description: "GET /api/brands/{brand_id}/seo-clusters — list a brand's clusters."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    CLUSTER_SORTABLE,
                    vec![PropertySpec::integer("brand_id", "Owning brand")],
                ),
                vec!["brand_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        cluster.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.cluster.PUT")?,
            description: "PUT /api/seo-clusters/{id} — partial update of a cluster.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Cluster id"),
                    PropertySpec::string("name", "New cluster name"),
                    PropertySpec::string("color", "New display color"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        cluster.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.cluster.DELETE")?,
            description: "DELETE /api/seo-clusters/{id} — delete a cluster and its keywords."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Cluster id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        cluster,
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.keywords.POST")?,
            description: "POST /api/seo-clusters/{seo_cluster_id}/keywords — add a keyword."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("seo_cluster_id", "Owning cluster"),
                    PropertySpec::string("term", "Keyword term"),
                ],
                vec!["seo_cluster_id", "term"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        keyword.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.keyword.GET")?,
            description: "GET /api/seo-keywords/{id} — fetch one keyword.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Keyword id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        keyword.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.keywords.GET")?,
            description: "GET /api/seo-clusters/{seo_cluster_id}/keywords — list keywords."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    KEYWORD_SORTABLE,
                    vec![PropertySpec::integer("seo_cluster_id", "Owning cluster")],
                ),
                vec!["seo_cluster_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        keyword.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.keyword.PUT")?,
            description: "PUT /api/seo-keywords/{id} — rename or reorder a keyword.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Keyword id"),
                    PropertySpec::string("term", "New keyword term"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        keyword.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("seo.keyword.DELETE")?,
            description: "DELETE /api/seo-keywords/{id} — remove a keyword.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Keyword id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        keyword,
        runtime.clone(),
    ))?;

    registry.register(FetchKeywordMetricsTool::shared(
        runtime.clone(),
        metrics,
    )?)?;

    Ok(())
}
