use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::context::InvocationContext;
use crate::reply::ToolReply;
use crate::schema::ToolDescriptor;

/// A single named operation exposed to callers. Implementations never let an
/// error escape `call`; every failure comes back as an error envelope.
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn call(&self, args: Map<String, Value>, ctx: &InvocationContext) -> ToolReply;
}

pub type SharedTool = Arc<dyn Tool>;
