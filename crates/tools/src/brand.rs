//! Brand tools (`brand.*`).

use std::sync::Arc;

use serde_json::Value;

use db::models::Brand;
use toolkit::{
    AuthRule, CascadeRule, ChildCount, CrudTool, CrudVerb, EntityConfig, ListRules, PropertySpec,
    RegistryError, ToolDescriptor, ToolError, ToolMetadata, ToolName, ToolRegistry, ToolRuntime,
    ToolSchema, row_map,
};

use crate::list_properties;

const SORTABLE: &[&str] = &["name", "created_at"];

fn config() -> Result<Arc<EntityConfig<Brand>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |brand| brand.name.clone(),
        parent: None,
        auth_subject: AuthRule::SelfSubject,
        pre_create: Some(|args, siblings| {
            let name = args.require_str("name")?;
            let taken = siblings
                .iter()
                .any(|row| row.get("name").and_then(Value::as_str) == Some(name));
            if taken {
                return Err(ToolError::DuplicateKey(format!(
                    "A brand named '{name}' already exists in this team."
                )));
            }
            Ok(())
        }),
        build: |args, _ctx, seed| {
            Ok(Brand {
                id: seed.id,
                uuid: seed.uuid,
                team_id: seed.team_id.ok_or_else(|| {
                    ToolError::Validation("An active team is required.".to_string())
                })?,
                name: args.require_str("name")?.to_string(),
                description: args.string("description"),
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |brand, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && brand.name != name
            {
                brand.name = name.to_string();
                changed = true;
            }
            if let Some(description) = args.str("description")
                && brand.description.as_deref() != Some(description)
            {
                brand.description = Some(description.to_string());
                changed = true;
            }
            Ok(changed)
        },
        project: |brand, _pctx| row_map(brand),
        list: ListRules {
            filterable: &[],
            searchable: &["name", "description"],
            sortable: SORTABLE,
            default_sort: "name",
            per_row_auth: false,
        },
        // A brand owns every board tree below it; deleting one clears the
        // whole subtree, ledger rows included.
        cascades: &[
            CascadeRule {
                kind: "ci_board",
                field: "brand_id",
                report_as: "ci_boards_deleted",
                children: &[CascadeRule {
                    kind: "ci_color",
                    field: "ci_board_id",
                    report_as: "colors_deleted",
                    children: &[],
                }],
            },
            CascadeRule {
                kind: "content_board",
                field: "brand_id",
                report_as: "content_boards_deleted",
                children: &[CascadeRule {
                    kind: "content_block",
                    field: "content_board_id",
                    report_as: "blocks_deleted",
                    children: &[CascadeRule {
                        kind: "block_text",
                        field: "content_block_id",
                        report_as: "texts_deleted",
                        children: &[],
                    }],
                }],
            },
            CascadeRule {
                kind: "kanban_board",
                field: "brand_id",
                report_as: "kanban_boards_deleted",
                children: &[CascadeRule {
                    kind: "kanban_task",
                    field: "kanban_board_id",
                    report_as: "tasks_deleted",
                    children: &[],
                }],
            },
            CascadeRule {
                kind: "seo_cluster",
                field: "brand_id",
                report_as: "clusters_deleted",
                children: &[CascadeRule {
                    kind: "seo_keyword",
                    field: "seo_cluster_id",
                    report_as: "keywords_deleted",
                    children: &[],
                }],
            },
            CascadeRule {
                kind: "seo_budget",
                field: "brand_id",
                report_as: "budgets_deleted",
                children: &[],
            },
            CascadeRule {
                kind: "api_cost_log",
                field: "brand_id",
                report_as: "cost_logs_deleted",
                children: &[],
            },
            CascadeRule {
                kind: "social_platform",
                field: "brand_id",
                report_as: "platforms_deleted",
                children: &[CascadeRule {
                    kind: "social_format",
                    field: "social_platform_id",
                    report_as: "formats_deleted",
                    children: &[],
                }],
            },
            CascadeRule {
                kind: "competitor",
                field: "brand_id",
                report_as: "competitors_deleted",
                children: &[],
            },
        ],
        counts: &[
            ChildCount {
                kind: "ci_board",
                field: "brand_id",
                report_as: "ci_boards_count",
            },
            ChildCount {
                kind: "content_board",
                field: "brand_id",
                report_as: "content_boards_count",
            },
            ChildCount {
                kind: "kanban_board",
                field: "brand_id",
                report_as: "kanban_boards_count",
            },
        ],
        list_op: Some(ToolName::parse("brand.brands.GET")?),
    }))
}

pub fn register(
    registry: &mut ToolRegistry,
    runtime: &Arc<ToolRuntime>,
) -> Result<(), RegistryError> {
    let config = config()?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("brand.brands.POST")?,
            description: "POST /api/brands — create a brand in the active team.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::string("name", "Brand name"),
                    PropertySpec::string("description", "Optional description"),
                    PropertySpec::integer("team_id", "Owning team; defaults to the active team")
                        .unset_on_zero(),
                ],
                vec!["name"],
            ),
            metadata: ToolMetadata::write().with_team(),
        },
        CrudVerb::Create,
        config.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("brand.brand.GET")?,
            description: "GET /api/brands/{id} — fetch one brand with board counts.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Brand id")],
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
            name: ToolName::parse("brand.brands.GET")?,
            description: "GET /api/brands — list the active team's brands.".to_string(),
            schema: ToolSchema::new(
                list_properties(
                    SORTABLE,
                    vec![
                        PropertySpec::integer(
                            "team_id",
                            "Team to list; defaults to the active team",
                        )
                        .unset_on_zero(),
                    ],
                ),
                vec![],
            ),
            metadata: ToolMetadata::query().with_team(),
        },
        CrudVerb::List,
        config.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("brand.brand.PUT")?,
            description: "PUT /api/brands/{id} — partial update of name/description.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Brand id"),
                    PropertySpec::string("name", "New brand name"),
                    PropertySpec::string("description", "New description"),
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
            name: ToolName::parse("brand.brand.DELETE")?,
            description: "DELETE /api/brands/{id} — delete a brand.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Brand id")],
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
    use serde_json::json;

    use toolkit::{EntityStore, InvocationContext};

    use crate::support::{call, call_ok, ctx, registry, runtime, seed_brand};

    #[tokio::test]
    async fn test_create_brand_with_name_and_team_from_context() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let data = call_ok(&registry, "brand.brands.POST", &ctx, json!({"name": "Acme"})).await;
        assert_eq!(data["id"].as_i64(), Some(1));
        assert!(data["uuid"].as_str().is_some());
        assert_eq!(data["name"], "Acme");
        assert_eq!(data["team_id"].as_i64(), Some(7));
        assert!(data["description"].is_null());
    }

    #[tokio::test]
    async fn test_create_without_name_inserts_nothing() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let reply = call(&registry, "brand.brands.POST", &ctx, json!({})).await;
        assert_eq!(reply.code(), Some("VALIDATION_ERROR"));

        let data = call_ok(&registry, "brand.brands.GET", &ctx, json!({})).await;
        assert_eq!(data["total"].as_i64(), Some(0));
    }

    #[tokio::test]
    async fn test_missing_principal_wins_over_missing_fields() {
        let runtime = runtime();
        let registry = registry(&runtime);
        // Args are also invalid; AUTH_ERROR must be reported first.
        let reply = call(
            &registry,
            "brand.brands.POST",
            &InvocationContext::anonymous(),
            json!({}),
        )
        .await;
        assert_eq!(reply.code(), Some("AUTH_ERROR"));
    }

    #[tokio::test]
    async fn test_duplicate_name_within_team() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        seed_brand(&registry, &ctx, "Acme").await;
        let reply = call(&registry, "brand.brands.POST", &ctx, json!({"name": "Acme"})).await;
        assert_eq!(reply.code(), Some("DUPLICATE_KEY"));

        // Same name in another team is fine.
        let other = ctx_other_team();
        let data = call_ok(&registry, "brand.brands.POST", &other, json!({"name": "Acme"})).await;
        assert_eq!(data["team_id"].as_i64(), Some(8));
    }

    fn ctx_other_team() -> InvocationContext {
        ctx(2, 8)
    }

    #[tokio::test]
    async fn test_team_id_zero_falls_back_to_context_team() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let data = call_ok(
            &registry,
            "brand.brands.POST",
            &ctx,
            json!({"name": "Acme", "team_id": "0"}),
        )
        .await;
        assert_eq!(data["team_id"].as_i64(), Some(7));
    }

    #[tokio::test]
    async fn test_get_unknown_brand_has_entity_specific_code() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let reply = call(&registry, "brand.brand.GET", &ctx, json!({"id": 99})).await;
        assert_eq!(reply.code(), Some("BRAND_NOT_FOUND"));
        assert_eq!(reply.message(), "Brand 99 was not found.");
    }

    #[tokio::test]
    async fn test_update_without_changes_keeps_updated_at() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let id = seed_brand(&registry, &ctx, "Acme").await;
        let before = call_ok(&registry, "brand.brand.GET", &ctx, json!({"id": id})).await;
        let after = call_ok(&registry, "brand.brand.PUT", &ctx, json!({"id": id})).await;
        assert_eq!(after["updated_at"], before["updated_at"]);
        assert_eq!(after["name"], "Acme");
    }

    #[tokio::test]
    async fn test_partial_update_leaves_absent_fields_untouched() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let id = seed_brand(&registry, &ctx, "Acme").await;
        let data = call_ok(
            &registry,
            "brand.brand.PUT",
            &ctx,
            json!({"id": id, "description": "Tooling"}),
        )
        .await;
        assert_eq!(data["name"], "Acme");
        assert_eq!(data["description"], "Tooling");
    }

    #[tokio::test]
    async fn test_cross_team_access_is_denied_without_mutation() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let owner = ctx(1, 7);
        let id = seed_brand(&registry, &owner, "Acme").await;

        let outsider = ctx(2, 8);
        let reply = call(
            &registry,
            "brand.brand.PUT",
            &outsider,
            json!({"id": id, "name": "Hijack"}),
        )
        .await;
        assert_eq!(reply.code(), Some("ACCESS_DENIED"));

        let data = call_ok(&registry, "brand.brand.GET", &owner, json!({"id": id})).await;
        assert_eq!(data["name"], "Acme");
    }

    #[tokio::test]
    async fn test_deleting_twice_reports_not_found() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let id = seed_brand(&registry, &ctx, "Acme").await;
        assert!(
            call(&registry, "brand.brand.DELETE", &ctx, json!({"id": id}))
                .await
                .is_ok()
        );
        let reply = call(&registry, "brand.brand.DELETE", &ctx, json!({"id": id})).await;
        assert_eq!(reply.code(), Some("BRAND_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_brand_delete_clears_every_descendant_row() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let id = seed_brand(&registry, &ctx, "Acme").await;

        call_ok(
            &registry,
            "ci.boards.POST",
            &ctx,
            json!({"brand_id": id, "name": "CI"}),
        )
        .await;
        call_ok(
            &registry,
            "ci.colors.POST",
            &ctx,
            json!({"ci_board_id": 1, "name": "Primary", "hex": "#112233"}),
        )
        .await;
        call_ok(
            &registry,
            "content.boards.POST",
            &ctx,
            json!({"brand_id": id, "name": "Launch"}),
        )
        .await;
        call_ok(
            &registry,
            "content.blocks.POST",
            &ctx,
            json!({"content_board_id": 1}),
        )
        .await;
        call_ok(
            &registry,
            "content.block_text.POST",
            &ctx,
            json!({"content_block_id": 1, "text": "Kurzer Text"}),
        )
        .await;
        call_ok(
            &registry,
            "kanban.boards.POST",
            &ctx,
            json!({"brand_id": id, "name": "Sprint"}),
        )
        .await;
        call_ok(
            &registry,
            "kanban.tasks.POST",
            &ctx,
            json!({"kanban_board_id": 1, "title": "Kickoff"}),
        )
        .await;
        call_ok(
            &registry,
            "seo.clusters.POST",
            &ctx,
            json!({"brand_id": id, "name": "Produkte"}),
        )
        .await;
        call_ok(
            &registry,
            "seo.keywords.POST",
            &ctx,
            json!({"seo_cluster_id": 1, "term": "kaffee"}),
        )
        .await;
        // Charging metrics creates the budget and cost-log rows.
        call_ok(&registry, "seo.keyword.FETCH_METRICS", &ctx, json!({"id": 1})).await;
        call_ok(
            &registry,
            "social.platforms.POST",
            &ctx,
            json!({"brand_id": id, "name": "Instagram"}),
        )
        .await;
        call_ok(
            &registry,
            "social.formats.POST",
            &ctx,
            json!({"social_platform_id": 1, "name": "Story"}),
        )
        .await;
        call_ok(
            &registry,
            "market.competitors.POST",
            &ctx,
            json!({"brand_id": id, "name": "Globex"}),
        )
        .await;

        let data = call_ok(&registry, "brand.brand.DELETE", &ctx, json!({"id": id})).await;
        for report in [
            "ci_boards_deleted",
            "colors_deleted",
            "content_boards_deleted",
            "blocks_deleted",
            "texts_deleted",
            "kanban_boards_deleted",
            "tasks_deleted",
            "clusters_deleted",
            "keywords_deleted",
            "budgets_deleted",
            "cost_logs_deleted",
            "platforms_deleted",
            "formats_deleted",
            "competitors_deleted",
        ] {
            assert_eq!(data[report].as_i64(), Some(1), "{report}");
        }
        // No descendant row of any depth may remain in the store.
        for kind in [
            "ci_board",
            "ci_color",
            "content_board",
            "content_block",
            "block_text",
            "kanban_board",
            "kanban_task",
            "seo_cluster",
            "seo_keyword",
            "seo_budget",
            "api_cost_log",
            "social_platform",
            "social_format",
            "competitor",
        ] {
            assert!(
                runtime.store.fetch(kind, 1).await.unwrap().is_none(),
                "{kind}"
            );
        }
    }

    #[tokio::test]
    async fn test_get_reports_board_counts() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let id = seed_brand(&registry, &ctx, "Acme").await;
        call_ok(
            &registry,
            "ci.boards.POST",
            &ctx,
            json!({"brand_id": id, "name": "CI"}),
        )
        .await;
        let data = call_ok(&registry, "brand.brand.GET", &ctx, json!({"id": id})).await;
        assert_eq!(data["ci_boards_count"].as_i64(), Some(1));
        assert_eq!(data["content_boards_count"].as_i64(), Some(0));
    }
}
