//! Content board tools (`content.*`).
//!
//! Boards hold ordered blocks; a block optionally points at one content
//! record. Only text content exists today, wired through two bespoke
//! executors because attaching content mutates two rows at once.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::{error, info};
use uuid::Uuid;

use db::models::{BlockText, ContentBlock, ContentBoard, ContentKind};
use toolkit::{
    Action, AuthRule, AuthSubject, CascadeRule, ChildCount, CrudTool, CrudVerb, DomainEntity,
    EntityConfig, InvocationContext, ListRules, Mutation, ParentLink, PropertySpec, RegistryError,
    SharedTool, Tool, ToolDescriptor, ToolError, ToolMetadata, ToolName, ToolRegistry, ToolReply,
    ToolRuntime, ToolSchema, invalidate_best_effort, row_map, to_row, validate,
};

use crate::list_properties;

const BOARD_SORTABLE: &[&str] = &["order", "name", "created_at"];
const BLOCK_SORTABLE: &[&str] = &["order", "name"];

/// Fallback block name, matching what the web UI inserts.
const DEFAULT_BLOCK_NAME: &str = "Neuer Block";

fn board_config() -> Result<Arc<EntityConfig<ContentBoard>>, RegistryError> {
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
            Ok(ContentBoard {
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
        counts: &[ChildCount {
            kind: "content_block",
            field: "content_board_id",
            report_as: "blocks_count",
        }],
        list_op: Some(ToolName::parse("content.boards.GET")?),
    }))
}

fn block_config() -> Result<Arc<EntityConfig<ContentBlock>>, RegistryError> {
    Ok(Arc::new(EntityConfig {
        display: |block| block.name.clone(),
        parent: Some(ParentLink {
            kind: "content_board",
            label: "Content board",
            field: "content_board_id",
            parent_id: |block| block.content_board_id,
            team_of: |row| row.get("team_id").and_then(Value::as_i64),
        }),
        auth_subject: AuthRule::ViaParent,
        pre_create: None,
        build: |args, _ctx, seed| {
            Ok(ContentBlock {
                id: seed.id,
                uuid: seed.uuid,
                content_board_id: args.require_i64("content_board_id")?,
                name: args
                    .str("name")
                    .unwrap_or(DEFAULT_BLOCK_NAME)
                    .to_string(),
                order: seed.order,
                content_kind: None,
                content_id: None,
                created_at: seed.now,
                updated_at: seed.now,
            })
        },
        apply: |block, args, _now| {
            let mut changed = false;
            if let Some(name) = args.str("name")
                && block.name != name
            {
                block.name = name.to_string();
                changed = true;
            }
            if let Some(order) = args.i64("order")
                && block.order != order
            {
                block.order = order;
                changed = true;
            }
            Ok(changed)
        },
        project: |block, pctx| {
            let mut data = row_map(block)?;
            data.insert("has_content".into(), json!(block.has_content()));
            if let Some(board_name) = pctx.parent_str("name") {
                data.insert("board_name".into(), json!(board_name));
            }
            Ok(data)
        },
        list: ListRules {
            filterable: &[],
            searchable: &["name"],
            sortable: BLOCK_SORTABLE,
            default_sort: "order",
            per_row_auth: false,
        },
        cascades: &[CascadeRule {
            kind: "block_text",
            field: "content_block_id",
            report_as: "texts_deleted",
            children: &[],
        }],
        counts: &[],
        list_op: Some(ToolName::parse("content.blocks.GET")?),
    }))
}

/// Resolves a block and its board, authorizing `action` against the board.
/// Block text has no scoping of its own.
async fn resolve_block(
    runtime: &ToolRuntime,
    ctx: &InvocationContext,
    block_id: i64,
    action: Action,
) -> Result<(ContentBlock, ContentBoard), ToolError> {
    let principal = ctx.principal()?;
    let repo = runtime.repo();
    let block: ContentBlock = repo.require(block_id).await?;
    let board: ContentBoard = repo.require(block.content_board_id).await?;
    let subject = AuthSubject {
        kind: ContentBoard::KIND,
        id: board.id,
        team_id: Some(board.team_id),
    };
    runtime.authorize(principal, action, &subject).await?;
    Ok((block, board))
}

fn text_payload(
    text: &BlockText,
    block: &ContentBlock,
    board: &ContentBoard,
) -> Result<Map<String, Value>, ToolError> {
    let mut data = row_map(text)?;
    data.insert("word_count".into(), json!(text.word_count()));
    data.insert("block_name".into(), json!(block.name));
    data.insert("board_name".into(), json!(board.name));
    Ok(data)
}

/// `content.block_text.POST` — attach text content to an empty block.
///
/// Inserts the text row and flips the block's content pointer in one atomic
/// batch, so a block never points at content that does not exist.
struct BlockTextCreateTool {
    descriptor: ToolDescriptor,
    list_op: ToolName,
    runtime: Arc<ToolRuntime>,
}

impl BlockTextCreateTool {
    fn shared(runtime: Arc<ToolRuntime>) -> Result<SharedTool, RegistryError> {
        Ok(Arc::new(BlockTextCreateTool {
            list_op: ToolName::parse("content.blocks.GET")?,
            descriptor: ToolDescriptor {
                name: ToolName::parse("content.block_text.POST")?,
                description:
                    "POST /api/content-blocks/{content_block_id}/text — attach text content."
                        .to_string(),
                schema: ToolSchema::new(
                    vec![
                        PropertySpec::integer("content_block_id", "Block to attach text to"),
                        PropertySpec::string("text", "The text content"),
                    ],
                    vec!["content_block_id", "text"],
                ),
                metadata: ToolMetadata::write(),
            },
            runtime,
        }))
    }

    async fn run(
        &self,
        args: Map<String, Value>,
        ctx: &InvocationContext,
    ) -> Result<ToolReply, ToolError> {
        let principal = ctx.principal()?.clone();
        let args = validate(&self.descriptor.schema, &args)?;
        let block_id = args.require_i64("content_block_id")?;
        let (mut block, board) =
            resolve_block(&self.runtime, ctx, block_id, Action::Create).await?;
        if block.has_content() {
            return Err(ToolError::ContentExists(format!(
                "Content block '{}' already has content.",
                block.name
            )));
        }

        let repo = self.runtime.repo();
        let now = Utc::now();
        let text = BlockText {
            id: repo.next_id::<BlockText>().await?,
            uuid: Uuid::new_v4(),
            content_block_id: block.id,
            text: args.require_str("text")?.to_string(),
            created_at: now,
            updated_at: now,
        };
        block.content_kind = Some(ContentKind::Text);
        block.content_id = Some(text.id);
        block.touch(now);
        repo.apply(vec![
            Mutation::Insert {
                kind: BlockText::KIND,
                id: text.id,
                row: to_row(&text)?,
            },
            Mutation::Replace {
                kind: ContentBlock::KIND,
                id: block.id,
                row: to_row(&block)?,
            },
        ])
        .await?;
        info!(
            tool = %self.descriptor.name,
            request_id = %ctx.request_id,
            block_id = block.id,
            text_id = text.id,
            "block text created"
        );
        invalidate_best_effort(
            self.runtime.cache.as_ref(),
            &self.list_op,
            principal.id,
            ctx.team_id,
        )
        .await;

        let data = text_payload(&text, &block, &board)?;
        Ok(ToolReply::ok(
            format!("Text content for block '{}' was created.", block.name),
            data,
        ))
    }
}

#[async_trait]
impl Tool for BlockTextCreateTool {
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

/// `content.block_text.GET` — read a block's text content with word count.
struct BlockTextGetTool {
    descriptor: ToolDescriptor,
    runtime: Arc<ToolRuntime>,
}

impl BlockTextGetTool {
    fn shared(runtime: Arc<ToolRuntime>) -> Result<SharedTool, RegistryError> {
        Ok(Arc::new(BlockTextGetTool {
            descriptor: ToolDescriptor {
                name: ToolName::parse("content.block_text.GET")?,
                description:
                    "GET /api/content-blocks/{content_block_id}/text — read text content."
                        .to_string(),
                schema: ToolSchema::new(
                    vec![PropertySpec::integer("content_block_id", "Block to read")],
                    vec!["content_block_id"],
                ),
                metadata: ToolMetadata::query(),
            },
            runtime,
        }))
    }

    async fn run(
        &self,
        args: Map<String, Value>,
        ctx: &InvocationContext,
    ) -> Result<ToolReply, ToolError> {
        ctx.principal()?;
        let args = validate(&self.descriptor.schema, &args)?;
        let block_id = args.require_i64("content_block_id")?;
        let (block, board) = resolve_block(&self.runtime, ctx, block_id, Action::View).await?;
        let text_id = match (block.content_kind, block.content_id) {
            (Some(ContentKind::Text), Some(text_id)) => text_id,
            _ => {
                return Err(ToolError::NoTextContent(format!(
                    "Content block '{}' has no text content.",
                    block.name
                )));
            }
        };
        let text: BlockText = self.runtime.repo().require(text_id).await?;
        let data = text_payload(&text, &block, &board)?;
        Ok(ToolReply::ok(
            format!("Text content for block '{}' retrieved.", block.name),
            data,
        ))
    }
}

#[async_trait]
impl Tool for BlockTextGetTool {
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
) -> Result<(), RegistryError> {
    let board = board_config()?;
    let block = block_config()?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("content.boards.POST")?,
            description: "POST /api/brands/{brand_id}/content-boards — create a content board."
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
            name: ToolName::parse("content.board.GET")?,
            description: "GET /api/content-boards/{id} — fetch one content board.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Content board id")],
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
            name: ToolName::parse("content.boards.GET")?,
            description: "GET /api/brands/{brand_id}/content-boards — list a brand's boards."
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
            name: ToolName::parse("content.board.PUT")?,
            description: "PUT /api/content-boards/{id} — rename or reorder a content board."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Content board id"),
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
            name: ToolName::parse("content.board.DELETE")?,
            description: "DELETE /api/content-boards/{id} — delete a board and its blocks."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Content board id")],
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
            name: ToolName::parse("content.blocks.POST")?,
            description: "POST /api/content-boards/{content_board_id}/blocks — create a block."
                .to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("content_board_id", "Owning content board"),
                    PropertySpec::string("name", "Block name; defaults when absent"),
                ],
                vec!["content_board_id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Create,
        block.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("content.block.GET")?,
            description: "GET /api/content-blocks/{id} — fetch one block.".to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Block id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::Get,
        block.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("content.blocks.GET")?,
            description: "GET /api/content-boards/{content_board_id}/blocks — list blocks."
                .to_string(),
            schema: ToolSchema::new(
                list_properties(
                    BLOCK_SORTABLE,
                    vec![PropertySpec::integer(
                        "content_board_id",
                        "Owning content board",
                    )],
                ),
                vec!["content_board_id"],
            ),
            metadata: ToolMetadata::query(),
        },
        CrudVerb::List,
        block.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("content.block.PUT")?,
            description: "PUT /api/content-blocks/{id} — rename or reorder a block.".to_string(),
            schema: ToolSchema::new(
                vec![
                    PropertySpec::integer("id", "Block id"),
                    PropertySpec::string("name", "New block name"),
                    PropertySpec::integer("order", "New display order"),
                ],
                vec!["id"],
            ),
            metadata: ToolMetadata::write(),
        },
        CrudVerb::Update,
        block.clone(),
        runtime.clone(),
    ))?;

    registry.register(CrudTool::shared(
        ToolDescriptor {
            name: ToolName::parse("content.block.DELETE")?,
            description: "DELETE /api/content-blocks/{id} — delete a block and its content."
                .to_string(),
            schema: ToolSchema::new(
                vec![PropertySpec::integer("id", "Block id")],
                vec!["id"],
            ),
            metadata: ToolMetadata::destructive(),
        },
        CrudVerb::Delete,
        block,
        runtime.clone(),
    ))?;

    registry.register(BlockTextCreateTool::shared(runtime.clone())?)?;
    registry.register(BlockTextGetTool::shared(runtime.clone())?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use toolkit::{EntityStore, InvocationContext, ToolRegistry};

    use crate::support::{call, call_ok, ctx, registry, runtime, seed_brand};

    async fn seed_block(registry: &ToolRegistry, ctx: &InvocationContext) -> i64 {
        let brand_id = seed_brand(registry, ctx, "Acme").await;
        let board = call_ok(
            registry,
            "content.boards.POST",
            ctx,
            json!({"brand_id": brand_id, "name": "Launch"}),
        )
        .await;
        let block = call_ok(
            registry,
            "content.blocks.POST",
            ctx,
            json!({"content_board_id": board["id"], "name": "Intro"}),
        )
        .await;
        block["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_block_without_name_gets_the_default() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let brand_id = seed_brand(&registry, &ctx, "Acme").await;
        let board = call_ok(
            &registry,
            "content.boards.POST",
            &ctx,
            json!({"brand_id": brand_id, "name": "Launch"}),
        )
        .await;
        let block = call_ok(
            &registry,
            "content.blocks.POST",
            &ctx,
            json!({"content_board_id": board["id"]}),
        )
        .await;
        assert_eq!(block["name"], "Neuer Block");
        assert_eq!(block["has_content"], json!(false));
    }

    #[tokio::test]
    async fn test_attach_text_reports_word_count_and_names() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let block_id = seed_block(&registry, &ctx).await;

        let data = call_ok(
            &registry,
            "content.block_text.POST",
            &ctx,
            json!({"content_block_id": block_id, "text": "Unser neues Produkt ist da"}),
        )
        .await;
        assert_eq!(data["word_count"].as_i64(), Some(5));
        assert_eq!(data["block_name"], "Intro");
        assert_eq!(data["board_name"], "Launch");

        let read = call_ok(
            &registry,
            "content.block_text.GET",
            &ctx,
            json!({"content_block_id": block_id}),
        )
        .await;
        assert_eq!(read["text"], "Unser neues Produkt ist da");

        let block = call_ok(
            &registry,
            "content.block.GET",
            &ctx,
            json!({"id": block_id}),
        )
        .await;
        assert_eq!(block["has_content"], json!(true));
        assert_eq!(block["content_kind"], "text");
    }

    #[tokio::test]
    async fn test_attaching_text_twice_is_rejected() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let block_id = seed_block(&registry, &ctx).await;
        call_ok(
            &registry,
            "content.block_text.POST",
            &ctx,
            json!({"content_block_id": block_id, "text": "Erster Entwurf"}),
        )
        .await;

        let reply = call(
            &registry,
            "content.block_text.POST",
            &ctx,
            json!({"content_block_id": block_id, "text": "Zweiter Entwurf"}),
        )
        .await;
        assert_eq!(reply.code(), Some("CONTENT_EXISTS"));

        // The first text must survive unchanged.
        let read = call_ok(
            &registry,
            "content.block_text.GET",
            &ctx,
            json!({"content_block_id": block_id}),
        )
        .await;
        assert_eq!(read["text"], "Erster Entwurf");
    }

    #[tokio::test]
    async fn test_reading_an_empty_block_reports_no_text_content() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let block_id = seed_block(&registry, &ctx).await;
        let reply = call(
            &registry,
            "content.block_text.GET",
            &ctx,
            json!({"content_block_id": block_id}),
        )
        .await;
        assert_eq!(reply.code(), Some("NO_TEXT_CONTENT"));
    }

    #[tokio::test]
    async fn test_block_delete_removes_its_text() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let block_id = seed_block(&registry, &ctx).await;
        call_ok(
            &registry,
            "content.block_text.POST",
            &ctx,
            json!({"content_block_id": block_id, "text": "Kurzer Text"}),
        )
        .await;

        let data = call_ok(
            &registry,
            "content.block.DELETE",
            &ctx,
            json!({"id": block_id}),
        )
        .await;
        assert_eq!(data["texts_deleted"].as_i64(), Some(1));
        let reply = call(
            &registry,
            "content.block_text.GET",
            &ctx,
            json!({"content_block_id": block_id}),
        )
        .await;
        assert_eq!(reply.code(), Some("CONTENT_BLOCK_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_board_delete_removes_block_texts_too() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let block_id = seed_block(&registry, &ctx).await;
        call_ok(
            &registry,
            "content.block_text.POST",
            &ctx,
            json!({"content_block_id": block_id, "text": "Kurzer Text"}),
        )
        .await;

        let data = call_ok(&registry, "content.board.DELETE", &ctx, json!({"id": 1})).await;
        assert_eq!(data["blocks_deleted"].as_i64(), Some(1));
        assert_eq!(data["texts_deleted"].as_i64(), Some(1));
        // The text row two levels down must not survive in the store.
        assert!(
            runtime
                .store
                .fetch("block_text", 1)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_malformed_text_row_surfaces_execution_error() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let block_id = seed_block(&registry, &ctx).await;
        call_ok(
            &registry,
            "content.block_text.POST",
            &ctx,
            json!({"content_block_id": block_id, "text": "Kurzer Text"}),
        )
        .await;
        // Corrupt the stored text row underneath the block's pointer.
        runtime
            .store
            .replace("block_text", 1, json!({"id": 1}))
            .await
            .unwrap();

        let reply = call(
            &registry,
            "content.block_text.GET",
            &ctx,
            json!({"content_block_id": block_id}),
        )
        .await;
        assert_eq!(reply.code(), Some("EXECUTION_ERROR"));
    }

    #[tokio::test]
    async fn test_board_delete_reports_deleted_blocks() {
        let runtime = runtime();
        let registry = registry(&runtime);
        let ctx = ctx(1, 7);
        let brand_id = seed_brand(&registry, &ctx, "Acme").await;
        let board = call_ok(
            &registry,
            "content.boards.POST",
            &ctx,
            json!({"brand_id": brand_id, "name": "Launch"}),
        )
        .await;
        for name in ["Intro", "Body"] {
            call_ok(
                &registry,
                "content.blocks.POST",
                &ctx,
                json!({"content_board_id": board["id"], "name": name}),
            )
            .await;
        }
        let data = call_ok(
            &registry,
            "content.board.DELETE",
            &ctx,
            json!({"id": board["id"]}),
        )
        .await;
        assert_eq!(data["blocks_deleted"].as_i64(), Some(2));
    }
}
