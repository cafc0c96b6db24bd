//! Generic CRUD-tool engine for the brand-management tool layer.
//!
//! A tool is a single named operation (`<domain>.<resource>.<VERB>`) bundling
//! a declared argument schema, an authorization requirement and one database
//! operation. Every invocation runs the same pipeline:
//!
//! principal check -> schema validation -> entity resolution -> authorization
//! -> execution -> best-effort cache invalidation -> result envelope.
//!
//! Entity-specific behavior lives in [`engine::EntityConfig`] values, not in
//! per-entity tool classes; the hosting dispatcher, persistence backend,
//! policy backend and cache store are external collaborators behind the
//! traits in [`gate`], [`store`] and [`cache`].

pub mod cache;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod gate;
pub mod metadata;
pub mod name;
pub mod registry;
pub mod reply;
pub mod runtime;
pub mod schema;
pub mod store;
pub mod tool;
pub mod validate;

pub use cache::{CacheError, CacheInvalidator, NoopInvalidator, invalidate_best_effort};
pub use config::ToolkitConfig;
pub use context::{InvocationContext, Principal};
pub use engine::{
    AuthRule, CascadeRule, ChildCount, CreateSeed, CrudTool, CrudVerb, EntityConfig, ListRules,
    ParentLink, ProjectionCtx,
};
pub use error::ToolError;
pub use gate::{Action, AuthSubject, AuthorizationGate, Denied, TeamScopedGate};
pub use metadata::{Category, RiskLevel, ToolMetadata};
pub use name::{NameError, ToolName, Verb};
pub use registry::{RegistryError, ToolRegistry};
pub use reply::ToolReply;
pub use runtime::ToolRuntime;
pub use schema::{PropType, PropertySpec, ToolDescriptor, ToolSchema};
pub use store::{DomainEntity, EntityStore, Mutation, Repo, StoreError, from_row, row_map, to_row};
pub use tool::{SharedTool, Tool};
pub use validate::{ValidatedArgs, validate};
