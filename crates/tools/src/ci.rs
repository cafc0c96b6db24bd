//! Corporate-identity board tools (`ci.*`).
//!
//! Colors carry no team column; they are authorized via their CI board.

use std::sync::Arc;

use serde_json::{Value, json};

use db::models::{CiBoard, CiColor};
use toolkit::{
    AuthRule, CascadeRule, ChildCount, CrudTool, CrudVerb, EntityConfig, ListRules, ParentLink,
    PropertySpec, RegistryError, ToolDescriptor, ToolError, ToolMetadata, ToolName, ToolRegistry,
    ToolRuntime, ToolSchema, row_map,
};

use crate::list_properties;

const BOARD_SORTABLE: &[&str] = &["order", "name", "created_at"];
const COLOR_SORTABLE: &[&str] = &["order", "name"];

fn board_config() -> Result<Arc<EntityConfig<CiBoard>>, RegistryError> {
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
            Ok(CiBoard {
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
            kind: "ci_color",
            field: "ci_board_id",
            report_as: "colors_deleted",
            children: &[],
        }],
        counts: &[ChildCount {
            kind: "ci_color",
            field: "ci_board_id",
            report_as: "colors_count",
        }],
        list_op: Some(ToolName::parse("ci.boards.GET")?),
    }))
}

fn color_config() -> Result<Arc<EntityConfig<CiColor>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |color| color.name.clone(),
        parent: Some(ParentLink {
            kind: "ci_board",
            label: "CI board",
            field: "ci_board_id",
            parent_id: |color| color.ci_board_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::ViaParent,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(CiColor {
                id: seed.id,
                uuid: seed.uuid,
                ci_board_id: args.require_i64("ci_board_id")?,
                name: args.require_str("name")?.to_string(),
                hex: args.require_str("hex")?.to_string(),
                order: seed.order,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |color, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && color.name != name
            {
                color.name = name.to_string();
                changed = true;
            }
            if let Some(hex) = args.str("hex")
                && color.hex != hex
            {
                color.hex = hex.to_string();
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && color.order != order
            {
                color.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |color, pctx| {
            let mut data = row_map(color)?;
            if let Some(board_name) = pctx.parent_str("name") {
                data.insert("board_name".into(), json!(board_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["name", "hex"],
            sortable: COLOR_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[],
        counts: &[],
        list_op: Some(ToolName::parse("ci.colors.GET")?),
    }))
}

pub fn register(
    registry: &mut ToolRegistry,
    runtime: &Arc<ToolRuntime>,
) -> Result<(), RegistryError> {
    let board = board_config()?;
    let color = color_config()?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("ci.boards.POST")?,
            description: "POST /api/brands/{brand_id}/ci-boards — create a CI board.".to_string(),
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
            name: ToolName::parse("ci.board.GET")?,
            description: "GET /api/ci-boards/{id} — fetch one CI board with color count."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "CI board id")],
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
            name: ToolName::parse("ci.boards.GET")?,
            description: "GET /api/brands/{brand_id}/ci-boards — list a brand's CI boards."
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
            name: ToolName::parse("ci.board.PUT")?,
            description: "PUT /api/ci-boards/{id} — rename or reorder a CI board.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "CI board id"),
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
            name: ToolName::parse("ci.board.DELETE")?,
            description: "DELETE /api/ci-boards/{id} — delete a CI board and its colors."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "CI board id")],
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
            name: ToolName::parse("ci.colors.POST")?,
            description: "POST /api/ci-boards/{ci_board_id}/colors — add a color.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("ci_board_id", "Owning CI board"),
                    PropertySpec::string("name", "Color name"),
                    PropertySpec::string("hex", "Hex value, e.g. #2563EB"),
                ],
                vec!["ci_board_id", "name", "hex"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        color.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("ci.color.GET")?,
            description: "GET /api/ci-colors/{id} — fetch one color.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Color id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        color.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("ci.colors.GET")?,
            description: "GET /api/ci-boards/{ci_board_id}/colors — list a board's colors."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    COLOR_SORTABLE,
                    vec![PropertySpec::integer("ci_board_id", "Owning CI board")],
                ),
                vec!["ci_board_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        color.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("ci.color.PUT")?,
            description: "PUT /api/ci-colors/{id} — partial update of a color.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Color id"),
                    PropertySpec::string("name", "New color name"),
                    PropertySpec::string("hex", "New hex value"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        color.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("ci.color.DELETE")?,
            description: "DELETE /api/ci-colors/{id} — remove a color.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Color id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        color,
        runtime.clone(),
    ))?;

    Ok(())
}
