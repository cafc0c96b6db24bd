//! Kanban tools (`kanban.*`).

use std::sync::Arc;

use serde_json::{Value, json};

use db::models::{KanbanBoard, KanbanTask};
use toolkit::{
    AuthRule, CascadeRule, ChildCount, CrudTool, CrudVerb, EntityConfig, ListRules, ParentLink,
    PropertySpec, RegistryError, ToolDescriptor, ToolError, ToolMetadata, ToolName, ToolRegistry,
    ToolRuntime, ToolSchema, row_map,
};

use crate::list_properties;

const BOARD_SORTABLE: &[&str] = &["order", "name", "created_at"];
const TASK_SORTABLE: &[&str] = &["order", "title", "created_at"];

fn board_config() -> Result<Arc<EntityConfig<KanbanBoard>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |board| board.name.clone(),
        parent: Some(ParentLink {
            kind: "brand",
            label: "Brand",
            field: "brand_id",
            parent_id: |board| board.brand_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::SelfSubject,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(KanbanBoard {
                id: seed.id,
                uuid: seed.uuid,
                brand_id: args.require_i64("brand_id")?,
                team_id: seed.team_id.ok_or_else(|| {
                    ToolError::Execution("Parent brand row is missing its team.".to_string())
                })?,
                name: args.require_str("name")?.to_string(),
                order: seed.order,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |board, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && board.name != name
            {
                board.name = name.to_string();
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && board.order != order
            {
                board.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |board, pctx| {
            let mut data = row_map(board)?;
            if let Some(brand_name) = pctx.parent_str("name") {
                data.insert("brand_name".into(), json!(brand_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["name"],
            sortable: BOARD_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[CascadeRule {
            kind: "kanban_task",
            field: "kanban_board_id",
            report_as: "tasks_deleted",
            children: &[],
        }],
        counts: &[ChildCount {
            kind: "kanban_task",
            field: "kanban_board_id",
            report_as: "tasks_count",
        }],
        list_op: Some(ToolName::parse("kanban.boards.GET")?),
    }))
}

fn task_config() -> Result<Arc<EntityConfig<KanbanTask>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |task| task.title.clone(),
        parent: Some(ParentLink {
            kind: "kanban_board",
            label: "Kanban board",
            field: "kanban_board_id",
            parent_id: |task| task.kanban_board_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::ViaParent,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(KanbanTask {
                id: seed.id,
                uuid: seed.uuid,
                kanban_board_id: args.require_i64("kanban_board_id")?,
                title: args.require_str("title")?.to_string(),
                description: args.string("description"),
                order: seed.order,
                done: false,
                done_at: None,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |task, args, now| {
            let mut changed = false;
            if let Some(title) = args.str("title")
                && task.title != title
            {
                task.title = title.to_string();
                changed = true;
            }
            if let Some(description) = args.str("description")
                && task.description.as_deref() != Some(description)
            {
                task.description = Some(description.to_string());
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && task.order != order
            {
                task.order = order;
                changed = true;
            }
            if let Some(done) = args.bool("done") {
                changed |= task.set_done(done, now);
            }
            Ok(changed)
        },
        project: |task, pctx| {
            let mut data = row_map(task)?;
            if let Some(board_name) = pctx.parent_str("name") {
                data.insert("board_name".into(), json!(board_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &["done"],
            searchable: &["title", "description"],
            sortable: TASK_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[],
        counts: &[],
        list_op: Some(ToolName::parse("kanban.tasks.GET")?),
    }))
}

pub fn register(
    registry: &mut ToolRegistry,
    runtime: &Arc<ToolRuntime>,
) -> Result<(), RegistryError> {
    let board = board_config()?;
    let task = task_config()?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.boards.POST")?,
            description: "POST /api/brands/{brand_id}/kanban-boards — create a kanban board."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("brand_id", "Owning brand"),
                    PropertySpec::string("name", "Board name"),
                ],
                vec!["brand_id", "name"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        board.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.board.GET")?,
            description: "GET /api/kanban-boards/{id} — fetch one board with task count."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Kanban board id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        board.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.boards.GET")?,
            description: "GET /api/brands/{brand_id}/kanban-boards — list a brand's boards."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    BOARD_SORTABLE,
                    vec![PropertySpec::integer("brand_id", "Owning brand")],
                ),
                vec!["brand_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        board.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.board.PUT")?,
            description: "PUT /api/kanban-boards/{id} — rename or reorder a board.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Kanban board id"),
                    PropertySpec::string("name", "New board name"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        board.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.board.DELETE")?,
            description: "DELETE /api/kanban-boards/{id} — delete a board and its tasks."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Kanban board id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        board,
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.tasks.POST")?,
            description: "POST /api/kanban-boards/{kanban_board_id}/tasks — create a task."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("kanban_board_id", "Owning kanban board"),
                    PropertySpec::string("title", "Task title"),
                    PropertySpec::string("description", "Optional description"),
                ],
                vec!["kanban_board_id", "title"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        task.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.task.GET")?,
            description: "GET /api/kanban-tasks/{id} — fetch one task.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Task id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        task.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.tasks.GET")?,
            description: "GET /api/kanban-boards/{kanban_board_id}/tasks — list tasks, \
                          optionally filtered by done state."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    TASK_SORTABLE,
                    vec![
                        PropertySpec::integer("kanban_board_id", "Owning kanban board"),
                        PropertySpec::boolean("done", "Only tasks with this done state"),
                    ],
                ),
                vec!["kanban_board_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        task.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.task.PUT")?,
            description: "PUT /api/kanban-tasks/{id} — partial update; toggling done stamps \
                          or clears the completion time."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Task id"),
                    PropertySpec::string("title", "New title"),
                    PropertySpec::string("description", "New description"),
                    PropertySpec::integer("order", "New display order"),
                    PropertySpec::boolean("done", "New done state"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        task.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("kanban.task.DELETE")?,
            description: "DELETE /api/kanban-tasks/{id} — delete a task.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Task id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        task,
        runtime.clone(),
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use db::MemoryStore;
    use toolkit::{
        InvocationContext, NoopInvalidator, TeamScopedGate, ToolRegistry, ToolRuntime,
        ToolkitConfig,
    };

    use crate::support::{call_ok, ctx, registry, runtime, seed_brand};

    async fn seed_board(registry: &ToolRegistry, ctx: &InvocationContext) -> i64 {
        let brand_id = seed_brand(registry, ctx, "Acme").await;
        let board = call_ok(
            registry,
            "kanban.boards.POST",
            ctx,
            json!({"brand_id": brand_id, "name": "Sprint"}),
        )
        .await;
        board["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_done_toggle_stamps_and_clears_done_at() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let board_id = seed_board(&registry, &ctx).await;
        let task = call_ok(
            &registry,
            "kanban.tasks.POST",
            &ctx,
            json!({"kanban_board_id": board_id, "title": "Ship it"}),
        )
        .await;
        assert_eq!(task["done"], json!(false));
        assert!(task["done_at"].is_null());
        let id = task["id"].as_i64().unwrap();

        let done = call_ok(
            &registry,
            "kanban.task.PUT",
            &ctx,
            json!({"id": id, "done": true}),
        )
        .await;
        assert_eq!(done["done"], json!(true));
        assert!(done["done_at"].as_str().is_some());

        let reopened = call_ok(
            &registry,
            "kanban.task.PUT",
            &ctx,
            json!({"id": id, "done": false}),
        )
        .await;
        assert_eq!(reopened["done"], json!(false));
        assert!(reopened["done_at"].is_null());
    }

    #[tokio::test]
    async fn test_setting_done_twice_does_not_move_the_stamp() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let board_id = seed_board(&registry, &ctx).await;
        let task = call_ok(
            &registry,
            "kanban.tasks.POST",
            &ctx,
            json!({"kanban_board_id": board_id, "title": "Ship it"}),
        )
        .await;
        let id = task["id"].as_i64().unwrap();
        let first = call_ok(
            &registry,
            "kanban.task.PUT",
            &ctx,
            json!({"id": id, "done": true}),
        )
        .await;
        let second = call_ok(
            &registry,
            "kanban.task.PUT",
            &ctx,
            json!({"id": id, "done": true}),
        )
        .await;
        assert_eq!(second["done_at"], first["done_at"]);
        assert_eq!(second["updated_at"], first["updated_at"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_done_state() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let board_id = seed_board(&registry, &ctx).await;
        for title in ["One", "Two", "Three"] {
            call_ok(
                &registry,
                "kanban.tasks.POST",
                &ctx,
                json!({"kanban_board_id": board_id, "title": title}),
            )
            .await;
        }
        call_ok(
            &registry,
            "kanban.task.PUT",
            &ctx,
            json!({"id": 2, "done": true}),
        )
        .await;

        let open = call_ok(
            &registry,
            "kanban.tasks.GET",
            &ctx,
            json!({"kanban_board_id": board_id, "done": false}),
        )
        .await;
        assert_eq!(open["total"].as_i64(), Some(2));
        let done = call_ok(
            &registry,
            "kanban.tasks.GET",
            &ctx,
            json!({"kanban_board_id": board_id, "done": true}),
        )
        .await;
        assert_eq!(done["total"].as_i64(), Some(1));
        assert_eq!(done["items"][0]["title"], "Two");
    }

    #[tokio::test]
    async fn test_page_size_is_capped_and_defaulted() {
        let runtime = ToolRuntime::new(
            Arc::new(MemoryStore::new()),
            Arc::new(TeamScopedGate::new()),
            Arc::new(NoopInvalidator),
            ToolkitConfig {
                max_page_size: 2,
                default_page_size: 1,
            },
        );
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let board_id = seed_board(&registry, &ctx).await;
        for title in ["One", "Two", "Three"] {
            call_ok(
                &registry,
                "kanban.tasks.POST",
                &ctx,
                json!({"kanban_board_id": board_id, "title": title}),
            )
            .await;
        }

        // No limit: the default page size applies; total still counts all.
        let defaulted = call_ok(
            &registry,
            "kanban.tasks.GET",
            &ctx,
            json!({"kanban_board_id": board_id}),
        )
        .await;
        assert_eq!(defaulted["count"].as_i64(), Some(1));
        assert_eq!(defaulted["total"].as_i64(), Some(3));

        // An oversized limit is capped server-side.
        let capped = call_ok(
            &registry,
            "kanban.tasks.GET",
            &ctx,
            json!({"kanban_board_id": board_id, "limit": 9999}),
        )
        .await;
        assert_eq!(capped["count"].as_i64(), Some(2));
    }
}
