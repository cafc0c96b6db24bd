//! Market analysis tools (`market.*`).
//!
//! Competitor listings re-check `view` per row; the coarse brand-scope check
//! is not enough when individual entries are restricted.

use std::sync::Arc;

use serde_json::{Value, json};

use db::models::Competitor;
use toolkit::{
    AuthRule, CrudTool, CrudVerb, EntityConfig, ListRules, ParentLink, PropertySpec,
    RegistryError, ToolDescriptor, ToolError, ToolMetadata, ToolName, ToolRegistry, ToolRuntime,
    ToolSchema, row_map,
};

use crate::list_properties;

const SORTABLE: &[&str] = &["order", "name", "created_at"];

fn config() -> Result<Arc<EntityConfig<Competitor>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |competitor| competitor.name.clone(),
        parent: Some(ParentLink {
            kind: "brand",
            label: "Brand",
            field: "brand_id",
            parent_id: |competitor| competitor.brand_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::SelfSubject,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(Competitor {
                id: seed.id,
                uuid: seed.uuid,
                brand_id: args.require_i64("brand_id")?,
                team_id: seed.team_id.ok_or_else(|| {
                    ToolError::Execution("Parent brand row is missing its team.".to_string())
                })?,
                name: args.require_str("name")?.to_string(),
                url: args.string("url"),
                order: seed.order,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |competitor, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && competitor.name != name
            {
                competitor.name = name.to_string();
                changed = true;
            }
            if let Some(url) = args.str("url")
                && competitor.url.as_deref() != Some(url)
            {
                competitor.url = Some(url.to_string());
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && competitor.order != order
            {
                competitor.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |competitor, pctx| {
            let mut data = row_map(competitor)?;
            if let Some(brand_name) = pctx.parent_str("name") {
                data.insert("brand_name".into(), json!(brand_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["name", "url"],
            sortable: SORTABLE,
            default_sort: "order",
            per_row_auth: true,
        },
        cascades: &[],
        counts: &[],
        list_op: Some(ToolName::parse("market.competitors.GET")?),
    }))
}

pub fn register(
    registry: &mut ToolRegistry,
    runtime: &Arc<ToolRuntime>,
) -> Result<(), RegistryError> {
    let config = config()?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("market.competitors.POST")?,
            description: "POST /api/brands/{brand_id}/competitors — add a competitor."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("brand_id", "Owning brand"),
                    PropertySpec::string("name", "Competitor name"),
                    PropertySpec::string("url", "Optional website URL"),
                ],
                vec!["brand_id", "name"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        config.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("market.competitor.GET")?,
            description: "GET /api/competitors/{id} — fetch one competitor.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Competitor id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        config.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("market.competitors.GET")?,
            description: "GET /api/brands/{brand_id}/competitors — list visible competitors."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    SORTABLE,
                    vec![PropertySpec::integer("brand_id", "Owning brand")],
                ),
                vec!["brand_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        config.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("market.competitor.PUT")?,
            description: "PUT /api/competitors/{id} — partial update of a competitor."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Competitor id"),
                    PropertySpec::string("name", "New competitor name"),
                    PropertySpec::string("url", "New website URL"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        config.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("market.competitor.DELETE")?,
            description: "DELETE /api/competitors/{id} — remove a competitor.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Competitor id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        config,
        runtime.clone(),
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;

    use toolkit::{Action, AuthSubject, AuthorizationGate, Denied, Principal};

    use crate::support::{call_ok, ctx, registry, runtime, runtime_with_gate, seed_brand};

    /// Denies `view` on one specific competitor row, allows everything else.
    struct HiddenCompetitorGate {
        hidden_id: i64,
    }

    #[async_trait]
    impl AuthorizationGate for HiddenCompetitorGate {
        async fn authorize(
            &self,
            _principal: &Principal,
            action: Action,
            subject: &AuthSubject,
        ) -> Result<(), Denied> {
            if action == Action::View && subject.kind == "competitor" && subject.id == self.hidden_id
            {
                return Err(Denied::new("You are not allowed to view this competitor."));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_listing_drops_rows_the_caller_may_not_view() {
        let runtime = runtime_with_gate(Arc::new(HiddenCompetitorGate { hidden_id: 2 }));
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let brand_id = seed_brand(&registry, &ctx, "Acme").await;
        for name in ["Globex", "Initech", "Umbrella"] {
            call_ok(
                &registry,
                "market.competitors.POST",
                &ctx,
                json!({"brand_id": brand_id, "name": name}),
            )
            .await;
        }

        let data = call_ok(
            &registry,
            "market.competitors.GET",
            &ctx,
            json!({"brand_id": brand_id}),
        )
        .await;
        // Initech (id 2) is hidden; the totals reflect the visible set only.
        assert_eq!(data["total"].as_i64(), Some(2));
        let names: Vec<_> = data["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Globex", "Umbrella"]);
    }

    #[tokio::test]
    async fn test_competitor_url_is_optional_and_patchable() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let brand_id = seed_brand(&registry, &ctx, "Acme").await;
        let created = call_ok(
            &registry,
            "market.competitors.POST",
            &ctx,
            json!({"brand_id": brand_id, "name": "Globex"}),
        )
        .await;
        assert!(created["url"].is_null());

        let updated = call_ok(
            &registry,
            "market.competitor.PUT",
            &ctx,
            json!({"id": created["id"], "url": "https://globex.example"}),
        )
        .await;
        assert_eq!(updated["url"], "https://globex.example");
        assert_eq!(updated["name"], "Globex");
    }

    #[tokio::test]
    async fn test_listing_searches_by_name() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let brand_id = seed_brand(&registry, &ctx, "Acme").await;
        for name in ["Globex", "Initech"] {
            call_ok(
                &registry,
                "market.competitors.POST",
                &ctx,
                json!({"brand_id": brand_id, "name": name}),
            )
            .await;
        }
        let data = call_ok(
            &registry,
            "market.competitors.GET",
            &ctx,
            json!({"brand_id": brand_id, "search": "glob"}),
        )
        .await;
        assert_eq!(data["total"].as_i64(), Some(1));
        assert_eq!(data["items"][0]["name"], "Globex");
    }
}
