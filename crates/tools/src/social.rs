//! Social media tools (`social.*`).

use std::sync::Arc;

use serde_json::{Value, json};

use db::models::{SocialFormat, SocialPlatform};
use toolkit::{
    AuthRule, CascadeRule, ChildCount, CrudTool, CrudVerb, EntityConfig, ListRules, ParentLink,
    PropertySpec, RegistryError, ToolDescriptor, ToolError, ToolMetadata, ToolName, ToolRegistry,
    ToolRuntime, ToolSchema, row_map,
};

use crate::list_properties;

const PLATFORM_SORTABLE: &[&str] = &["order", "name"];
const FORMAT_SORTABLE: &[&str] = &["order", "name"];

fn platform_config() -> Result<Arc<EntityConfig<SocialPlatform>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |platform| platform.name.clone(),
        parent: Some(ParentLink {
            kind: "brand",
            label: "Brand",
            field: "brand_id",
            parent_id: |platform| platform.brand_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::SelfSubject,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(SocialPlatform {
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
        apply: |platform, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && platform.name != name
            {
                platform.name = name.to_string();
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && platform.order != order
            {
                platform.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |platform, pctx| {
            let mut data = row_map(platform)?;
            if let Some(brand_name) = pctx.parent_str("name") {
                data.insert("brand_name".into(), json!(brand_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["name"],
            sortable: PLATFORM_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[CascadeRule {
            kind: "social_format",
            field: "social_platform_id",
            report_as: "formats_deleted",
            children: &[],
        }],
        counts: &[ChildCount {
            kind: "social_format",
            field: "social_platform_id",
            report_as: "formats_count",
        }],
        list_op: Some(ToolName::parse("social.platforms.GET")?),
    }))
}

fn format_config() -> Result<Arc<EntityConfig<SocialFormat>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |format| format.name.clone(),
        parent: Some(ParentLink {
            kind: "social_platform",
            label: "Social platform",
            field: "social_platform_id",
            parent_id: |format| format.social_platform_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::ViaParent,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(SocialFormat {
                id: seed.id,
                uuid: seed.uuid,
                social_platform_id: args.require_i64("social_platform_id")?,
                name: args.require_str("name")?.to_string(),
                width: args.i64("width"),
                height: args.i64("height"),
                order: seed.order,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |format, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && format.name != name
            {
                format.name = name.to_string();
                changed = true;
            }
            if let Some(width) = args.i64("width")
                && format.width != Some(width)
            {
                format.width = Some(width);
                changed = true;
            }
            if let Some(height) = args.i64("height")
                && format.height != Some(height)
            {
                format.height = Some(height);
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && format.order != order
            {
                format.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |format, pctx| {
            let mut data = row_map(format)?;
            if let Some(platform_name) = pctx.parent_str("name") {
                data.insert("platform_name".into(), json!(platform_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["name"],
            sortable: FORMAT_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[],
        counts: &[],
        list_op: Some(ToolName::parse("social.formats.GET")?),
    }))
}

pub fn register(
    registry: &mut ToolRegistry,
    runtime: &Arc<ToolRuntime>,
) -> Result<(), RegistryError> {
    let platform = platform_config()?;
    let format = format_config()?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.platforms.POST")?,
            description: "POST /api/brands/{brand_id}/social-platforms — add a platform."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("brand_id", "Owning brand"),
                    PropertySpec::string("name", "Platform name"),
                ],
                vec!["brand_id", "name"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        platform.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.platform.GET")?,
            description: "GET /api/social-platforms/{id} — fetch one platform with format count."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Platform id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        platform.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.platforms.GET")?,
            description: "GET /api/brands/{brand_id}/social-platforms — list platforms."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    PLATFORM_SORTABLE,
                    vec![PropertySpec::integer("brand_id", "Owning brand")],
                ),
                vec!["brand_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        platform.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.platform.PUT")?,
            description: "PUT /api/social-platforms/{id} — rename or reorder a platform."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Platform id"),
                    PropertySpec::string("name", "New platform name"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        platform.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.platform.DELETE")?,
            description: "DELETE /api/social-platforms/{id} — delete a platform and its formats."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Platform id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        platform,
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.formats.POST")?,
            description: "POST /api/social-platforms/{social_platform_id}/formats — add a format."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("social_platform_id", "Owning platform"),
                    PropertySpec::string("name", "Format name, e.g. Story"),
                    PropertySpec::integer("width", "Pixel width"),
                    PropertySpec::integer("height", "Pixel height"),
                ],
                vec!["social_platform_id", "name"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        format.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.format.GET")?,
            description: "GET /api/social-formats/{id} — fetch one format.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Format id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        format.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.formats.GET")?,
            description: "GET /api/social-platforms/{social_platform_id}/formats — list formats."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    FORMAT_SORTABLE,
                    vec![PropertySpec::integer(
                        "social_platform_id",
                        "Owning platform",
                    )],
                ),
                vec!["social_platform_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        format.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.format.PUT")?,
            description: "PUT /api/social-formats/{id} — partial update of a format.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Format id"),
                    PropertySpec::string("name", "New format name"),
                    PropertySpec::integer("width", "New pixel width"),
                    PropertySpec::integer("height", "New pixel height"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        format.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("social.format.DELETE")?,
            description: "DELETE /api/social-formats/{id} — remove a format.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Format id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        format,
        runtime.clone(),
    ))?;

    Ok(())
}
