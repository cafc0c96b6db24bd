//! Generic per-verb CRUD executors.
//!
//! One engine, parameterized by [`EntityConfig`]: entity-specific behavior
//! (defaults, patch rules, projections, scoping, cascade rules, list
//! allow-lists) is configuration, not new tool code. Every verb runs the
//! same pipeline and converts every failure into an error envelope.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use tracing::{error, info};
use uuid::Uuid;

use crate::cache::invalidate_best_effort;
use crate::context::{InvocationContext, Principal};
use crate::error::ToolError;
use crate::gate::{Action, AuthSubject};
use crate::name::ToolName;
use crate::reply::ToolReply;
use crate::runtime::ToolRuntime;
use crate::schema::ToolDescriptor;
use crate::store::{DomainEntity, Mutation, from_row};
use crate::tool::{SharedTool, Tool};
use crate::validate::{ValidatedArgs, validate};

/// Inputs the engine resolves before an entity is built: fresh ids, the
/// creation timestamp, the next display-order slot, the effective team and
/// the eagerly loaded parent row (when the entity is nested).
#[derive(Debug, Clone)]
pub struct CreateSeed {
    pub id: i64,
    pub uuid: Uuid,
    pub now: DateTime<Utc>,
    pub order: i64,
    pub team_id: Option<i64>,
    pub parent: Option<Value>,
}

/// Relations eagerly loaded for a projection.
#[derive(Debug, Clone, Default)]
pub struct ProjectionCtx {
    pub parent: Option<Value>,
}

impl ProjectionCtx {
    pub fn parent_str(&self, field: &str) -> Option<&str> {
        self.parent
            .as_ref()
            .and_then(|p| p.get(field))
            .and_then(Value::as_str)
    }

    pub fn parent_i64(&self, field: &str) -> Option<i64> {
        self.parent
            .as_ref()
            .and_then(|p| p.get(field))
            .and_then(Value::as_i64)
    }
}

pub type BuildFn<E> = fn(&ValidatedArgs, &InvocationContext, &CreateSeed) -> Result<E, ToolError>;
/// Applies the fields present in the input; returns whether anything changed.
pub type ApplyFn<E> = fn(&mut E, &ValidatedArgs, DateTime<Utc>) -> Result<bool, ToolError>;
pub type ProjectFn<E> = fn(&E, &ProjectionCtx) -> Result<Map<String, Value>, ToolError>;
/// Business precondition over the scope's existing rows (duplicate guards).
pub type PreCreateFn = fn(&ValidatedArgs, &[Value]) -> Result<(), ToolError>;

/// Where a nested entity hangs. `field` is both the foreign-key field on the
/// stored rows and the scoping argument name of Create/List.
pub struct ParentLink<E> {
    pub kind: &'static str,
    pub label: &'static str,
    pub field: &'static str,
    pub parent_id: fn(&E) -> i64,
    pub team_of: fn(&Value) -> Option<i64>,
}

/// How the authorization subject is derived from the resolved entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRule {
    /// The entity itself is the subject.
    SelfSubject,
    /// The parent record is the subject (content block text is authorized
    /// via its content board, not itself).
    ViaParent,
}

/// List allow-lists. Fields outside these lists are never filterable,
/// searchable or sortable, whatever the caller sends.
pub struct ListRules {
    pub filterable: &'static [&'static str],
    pub searchable: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub default_sort: &'static str,
    /// Re-check `view` per row when the coarse scope check is not enough.
    pub per_row_auth: bool,
}

impl Default for ListRules {
    fn default() -> Self {
        ListRules {
            filterable: &[],
            searchable: &[],
            sortable: &["order"],
            default_sort: "order",
            per_row_auth: false,
        }
    }
}

/// Children removed together with the entity; the count is reported in the
/// delete response under `report_as`. `children` are the next level down,
/// removed in the same batch so no descendant row ever outlives its scope.
pub struct CascadeRule {
    pub kind: &'static str,
    pub field: &'static str,
    pub report_as: &'static str,
    pub children: &'static [CascadeRule],
}

/// Child aggregate included in Get/Update projections.
pub struct ChildCount {
    pub kind: &'static str,
    pub field: &'static str,
    pub report_as: &'static str,
}

/// Everything entity-specific the generic engine needs.
pub struct EntityConfig<E: DomainEntity> {
    pub display: fn(&E) -> String,
    pub parent: Option<ParentLink<E>>,
    pub auth_subject: AuthRule,
    pub pre_create: Option<PreCreateFn>,
    pub build: BuildFn<E>,
    pub apply: ApplyFn<E>,
    pub project: ProjectFn<E>,
    pub list: ListRules,
    pub cascades: &'static [CascadeRule],
    pub counts: &'static [ChildCount],
    /// List operation whose cached views are invalidated after writes.
    pub list_op: Option<ToolName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudVerb {
    Create,
    Get,
    List,
    Update,
    Delete,
}

pub struct CrudTool<E: DomainEntity> {
    descriptor: ToolDescriptor,
    verb: CrudVerb,
    config: Arc<EntityConfig<E>>,
    runtime: Arc<ToolRuntime>,
}

impl<E: DomainEntity> CrudTool<E> {
    pub fn shared(
        descriptor: ToolDescriptor,
        verb: CrudVerb,
        config: Arc<EntityConfig<E>>,
        runtime: Arc<ToolRuntime>,
    ) -> SharedTool {
        Arc::new(CrudTool {
            descriptor,
            verb,
            config,
            runtime,
        })
    }

    fn self_subject(&self, entity: &E) -> AuthSubject {
        AuthSubject {
            kind: E::KIND,
            id: entity.id(),
            team_id: entity.team_id(),
        }
    }

    async fn load_parent_row(
        &self,
        link: &ParentLink<E>,
        parent_id: i64,
    ) -> Result<Value, ToolError> {
        self.runtime
            .store
            .fetch(link.kind, parent_id)
            .await
            .map_err(ToolError::from)?
            .ok_or(ToolError::NotFound {
                kind: link.kind,
                label: link.label,
                id: parent_id,
            })
    }

    /// Authorization subject per the configured rule, plus the parent row
    /// eagerly loaded for the projection when the entity declares one.
    async fn subject_for(&self, entity: &E) -> Result<(AuthSubject, Option<Value>), ToolError> {
        match (&self.config.parent, self.config.auth_subject) {
            (Some(link), AuthRule::ViaParent) => {
                let parent_id = (link.parent_id)(entity);
                let row = self.load_parent_row(link, parent_id).await?;
                let subject = AuthSubject {
                    kind: link.kind,
                    id: parent_id,
                    team_id: (link.team_of)(&row),
                };
                Ok((subject, Some(row)))
            }
            (Some(link), AuthRule::SelfSubject) => {
                let parent_id = (link.parent_id)(entity);
                let row = self.load_parent_row(link, parent_id).await?;
                Ok((self.self_subject(entity), Some(row)))
            }
            (None, _) => Ok((self.self_subject(entity), None)),
        }
    }

    async fn invalidate(&self, principal: &Principal, ctx: &InvocationContext) {
        if let Some(list_op) = &self.config.list_op {
            invalidate_best_effort(
                self.runtime.cache.as_ref(),
                list_op,
                principal.id,
                ctx.team_id,
            )
            .await;
        }
    }

    async fn project_with_counts(
        &self,
        entity: &E,
        pctx: &ProjectionCtx,
    ) -> Result<Map<String, Value>, ToolError> {
        let mut data = (self.config.project)(entity, pctx)?;
        for count in self.config.counts {
            let rows = self
                .runtime
                .repo()
                .matching_rows(count.kind, count.field, &json!(entity.id()))
                .await?;
            data.insert(count.report_as.to_string(), json!(rows.len()));
        }
        Ok(data)
    }

    fn effective_team(
        &self,
        args: &ValidatedArgs,
        ctx: &InvocationContext,
    ) -> Result<i64, ToolError> {
        args.i64("team_id")
            .or(ctx.team_id)
            .ok_or_else(|| ToolError::Validation("An active team is required.".to_string()))
    }

    async fn create(
        &self,
        args: &ValidatedArgs,
        ctx: &InvocationContext,
        principal: &Principal,
    ) -> Result<ToolReply, ToolError> {
        let repo = self.runtime.repo();
        let (siblings, parent_row, subject, team_id) = match &self.config.parent {
            Some(link) => {
                let parent_id = args.require_i64(link.field)?;
                let row = self.load_parent_row(link, parent_id).await?;
                let team = (link.team_of)(&row);
                let siblings = repo.matching_rows(E::KIND, link.field, &json!(parent_id)).await?;
                let subject = AuthSubject {
                    kind: link.kind,
                    id: parent_id,
                    team_id: team,
                };
                (siblings, Some(row), subject, team)
            }
            None => {
                let team = self.effective_team(args, ctx)?;
                let siblings = repo.matching_rows(E::KIND, "team_id", &json!(team)).await?;
                let subject = AuthSubject {
                    kind: "team",
                    id: team,
                    team_id: Some(team),
                };
                (siblings, None, subject, Some(team))
            }
        };
        self.runtime
            .authorize(principal, Action::Create, &subject)
            .await?;
        if let Some(pre_create) = self.config.pre_create {
            pre_create(args, &siblings)?;
        }
        // New rows sort after every existing sibling, including gaps left by
        // deletions.
        let next_order = siblings
            .iter()
            .filter_map(|row| row.get("order").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1;
        let seed = CreateSeed {
            id: repo.next_id::<E>().await?,
            uuid: Uuid::new_v4(),
            now: Utc::now(),
            order: next_order,
            team_id,
            parent: parent_row.clone(),
        };
        let entity = (self.config.build)(args, ctx, &seed)?;
        repo.insert(&entity).await?;
        info!(
            tool = %self.descriptor.name,
            request_id = %ctx.request_id,
            entity = E::KIND,
            id = entity.id(),
            "created"
        );
        self.invalidate(principal, ctx).await;
        let pctx = ProjectionCtx { parent: parent_row };
        let data = self.project_with_counts(&entity, &pctx).await?;
        let display = (self.config.display)(&entity);
        Ok(ToolReply::ok(
            format!("{} '{}' was created.", E::LABEL, display),
            data,
        ))
    }

    async fn get(
        &self,
        args: &ValidatedArgs,
        _ctx: &InvocationContext,
        principal: &Principal,
    ) -> Result<ToolReply, ToolError> {
        let id = args.require_i64("id")?;
        let entity: E = self.runtime.repo().require(id).await?;
        let (subject, parent_row) = self.subject_for(&entity).await?;
        self.runtime
            .authorize(principal, Action::View, &subject)
            .await?;
        let pctx = ProjectionCtx { parent: parent_row };
        let data = self.project_with_counts(&entity, &pctx).await?;
        let display = (self.config.display)(&entity);
        Ok(ToolReply::ok(
            format!("{} '{}' retrieved.", E::LABEL, display),
            data,
        ))
    }

    async fn list(
        &self,
        args: &ValidatedArgs,
        ctx: &InvocationContext,
        principal: &Principal,
    ) -> Result<ToolReply, ToolError> {
        let repo = self.runtime.repo();
        let rules = &self.config.list;
        let (rows, parent_row) = match &self.config.parent {
            Some(link) => {
                let parent_id = args.require_i64(link.field)?;
                let row = self.load_parent_row(link, parent_id).await?;
                let subject = AuthSubject {
                    kind: link.kind,
                    id: parent_id,
                    team_id: (link.team_of)(&row),
                };
                self.runtime
                    .authorize(principal, Action::View, &subject)
                    .await?;
                let rows = repo.matching_rows(E::KIND, link.field, &json!(parent_id)).await?;
                (rows, Some(row))
            }
            None => {
                let team = self.effective_team(args, ctx)?;
                let subject = AuthSubject {
                    kind: "team",
                    id: team,
                    team_id: Some(team),
                };
                self.runtime
                    .authorize(principal, Action::View, &subject)
                    .await?;
                let rows = repo.matching_rows(E::KIND, "team_id", &json!(team)).await?;
                (rows, None)
            }
        };

        let mut rows: Vec<Value> = rows
            .into_iter()
            .filter(|row| {
                rules.filterable.iter().all(|field| match args.value(field) {
                    Some(expected) => row.get(*field) == Some(expected),
                    None => true,
                })
            })
            .collect();
        if let Some(term) = args.str("search") {
            let needle = term.to_lowercase();
            rows.retain(|row| {
                rules.searchable.iter().any(|field| {
                    row.get(*field)
                        .and_then(Value::as_str)
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
                })
            });
        }
        let sort_field = args
            .str("sort")
            .filter(|f| rules.sortable.contains(f))
            .unwrap_or(rules.default_sort);
        rows.sort_by(|a, b| compare_fields(a.get(sort_field), b.get(sort_field)));
        if args.str("direction") == Some("desc") {
            rows.reverse();
        }

        let mut entities = rows
            .into_iter()
            .map(from_row::<E>)
            .collect::<Result<Vec<_>, _>>()?;
        if rules.per_row_auth {
            let mut kept = Vec::with_capacity(entities.len());
            for entity in entities {
                let subject = self.self_subject(&entity);
                if self
                    .runtime
                    .gate
                    .authorize(principal, Action::View, &subject)
                    .await
                    .is_ok()
                {
                    kept.push(entity);
                }
            }
            entities = kept;
        }
        let total = entities.len();

        let limit = args
            .i64("limit")
            .map(|l| l.max(0) as usize)
            .unwrap_or(self.runtime.config.default_page_size)
            .min(self.runtime.config.max_page_size);
        let offset = args.i64("offset").map(|o| o.max(0) as usize).unwrap_or(0);

        let pctx = ProjectionCtx { parent: parent_row };
        let mut items = Vec::new();
        for entity in entities.iter().skip(offset).take(limit) {
            items.push(Value::Object((self.config.project)(entity, &pctx)?));
        }
        let mut data = Map::new();
        data.insert("count".into(), json!(items.len()));
        data.insert("total".into(), json!(total));
        data.insert("items".into(), Value::Array(items));
        Ok(ToolReply::ok(
            format!("Found {} {} record(s).", total, E::LABEL),
            data,
        ))
    }

    async fn update(
        &self,
        args: &ValidatedArgs,
        ctx: &InvocationContext,
        principal: &Principal,
    ) -> Result<ToolReply, ToolError> {
        let repo = self.runtime.repo();
        let id = args.require_i64("id")?;
        let mut entity: E = repo.require(id).await?;
        let (subject, parent_row) = self.subject_for(&entity).await?;
        self.runtime
            .authorize(principal, Action::Update, &subject)
            .await?;
        let now = Utc::now();
        let changed = (self.config.apply)(&mut entity, args, now)?;
        if changed {
            entity.touch(now);
            repo.replace(&entity).await?;
            info!(
                tool = %self.descriptor.name,
                request_id = %ctx.request_id,
                entity = E::KIND,
                id,
                "updated"
            );
            self.invalidate(principal, ctx).await;
        }
        let pctx = ProjectionCtx { parent: parent_row };
        let data = self.project_with_counts(&entity, &pctx).await?;
        let display = (self.config.display)(&entity);
        Ok(ToolReply::ok(
            format!("{} '{}' was updated.", E::LABEL, display),
            data,
        ))
    }

    async fn delete(
        &self,
        args: &ValidatedArgs,
        ctx: &InvocationContext,
        principal: &Principal,
    ) -> Result<ToolReply, ToolError> {
        let repo = self.runtime.repo();
        let id = args.require_i64("id")?;
        let entity: E = repo.require(id).await?;
        let (subject, _parent_row) = self.subject_for(&entity).await?;
        self.runtime
            .authorize(principal, Action::Delete, &subject)
            .await?;

        // Display fields are captured before destruction for the response.
        let display = (self.config.display)(&entity);
        let mut data = Map::new();
        data.insert("id".into(), json!(id));
        data.insert("name".into(), json!(display));
        if let Some(link) = &self.config.parent {
            data.insert(link.field.to_string(), json!((link.parent_id)(&entity)));
        }

        // Walk the cascade tree breadth-first, collecting every descendant
        // into one batch; the delete removes the whole subtree or nothing.
        let mut batch = Vec::new();
        let mut removed: Vec<(&'static str, usize)> = Vec::new();
        let mut queue: Vec<(&'static CascadeRule, Vec<i64>)> = self
            .config
            .cascades
            .iter()
            .map(|rule| (rule, vec![id]))
            .collect();
        while let Some((rule, parents)) = queue.pop() {
            let mut child_ids = Vec::new();
            for parent_id in parents {
                let children = repo
                    .matching_rows(rule.kind, rule.field, &json!(parent_id))
                    .await?;
                for child in &children {
                    if let Some(child_id) = child.get("id").and_then(Value::as_i64) {
                        batch.push(Mutation::Remove {
                            kind: rule.kind,
                            id: child_id,
                        });
                        child_ids.push(child_id);
                    }
                }
            }
            match removed.iter_mut().find(|(name, _)| *name == rule.report_as) {
                Some((_, count)) => *count += child_ids.len(),
                None => removed.push((rule.report_as, child_ids.len())),
            }
            for nested in rule.children {
                queue.push((nested, child_ids.clone()));
            }
        }
        for (report_as, count) in removed {
            data.insert(report_as.to_string(), json!(count));
        }
        batch.push(Mutation::Remove { kind: E::KIND, id });
        repo.apply(batch).await?;
        info!(
            tool = %self.descriptor.name,
            request_id = %ctx.request_id,
            entity = E::KIND,
            id,
            "deleted"
        );
        self.invalidate(principal, ctx).await;
        Ok(ToolReply::ok(
            format!("{} '{}' was deleted.", E::LABEL, display),
            data,
        ))
    }

    async fn run(
        &self,
        args: Map<String, Value>,
        ctx: &InvocationContext,
    ) -> Result<ToolReply, ToolError> {
        // The principal check strictly precedes validation, resolution and
        // authorization for every operation.
        let principal = ctx.principal()?.clone();
        let args = validate(&self.descriptor.schema, &args)?;
        match self.verb {
            CrudVerb::Create => self.create(&args, ctx, &principal).await,
            CrudVerb::Get => self.get(&args, ctx, &principal).await,
            CrudVerb::List => self.list(&args, ctx, &principal).await,
            CrudVerb::Update => self.update(&args, ctx, &principal).await,
            CrudVerb::Delete => self.delete(&args, ctx, &principal).await,
        }
    }
}

#[async_trait]
impl<E: DomainEntity> Tool for CrudTool<E> {
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

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Rows missing the sort field go last.
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
