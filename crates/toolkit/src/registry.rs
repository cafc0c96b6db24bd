use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::context::InvocationContext;
use crate::name::NameError;
use crate::reply::ToolReply;
use crate::tool::SharedTool;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("tool '{name}': {problem}")]
    Metadata { name: String, problem: String },
}

/// Name-keyed tool table. Metadata invariants are enforced at registration,
/// not trusted at call time.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, SharedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: SharedTool) -> Result<(), RegistryError> {
        let descriptor = tool.descriptor();
        let name = descriptor.name.to_string();
        descriptor
            .metadata
            .validate(&descriptor.name)
            .map_err(|problem| RegistryError::Metadata {
                name: name.clone(),
                problem,
            })?;
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SharedTool> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptor export for the hosting dispatcher.
    pub fn descriptors(&self) -> Vec<Value> {
        self.tools.values().map(|t| t.descriptor().to_json()).collect()
    }

    pub async fn dispatch(
        &self,
        name: &str,
        args: Map<String, Value>,
        ctx: &InvocationContext,
    ) -> ToolReply {
        match self.tools.get(name) {
            Some(tool) => tool.call(args, ctx).await,
            None => ToolReply::Error {
                code: "EXECUTION_ERROR".to_string(),
                message: format!("No tool named '{name}' is registered."),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::metadata::ToolMetadata;
    use crate::name::ToolName;
    use crate::schema::{ToolDescriptor, ToolSchema};
    use crate::tool::Tool;

    struct FixedTool {
        descriptor: ToolDescriptor,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn call(&self, _args: Map<String, Value>, _ctx: &InvocationContext) -> ToolReply {
            ToolReply::ok("ok", Map::new())
        }
    }

    fn tool(name: &str, metadata: ToolMetadata) -> SharedTool {
        Arc::new(FixedTool {
            descriptor: ToolDescriptor {
                name: ToolName::parse(name).unwrap(),
                description: "GET /api/test".to_string(),
                schema: ToolSchema::empty(),
                metadata,
            },
        })
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register(tool("brand.brands.GET", ToolMetadata::query()))
            .unwrap();
        let err = registry
            .register(tool("brand.brands.GET", ToolMetadata::query()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(_)));
    }

    #[test]
    fn test_metadata_invariants_checked_at_registration() {
        let mut registry = ToolRegistry::new();
        // DELETE without destructive risk level must not register.
        let err = registry
            .register(tool("brand.brand.DELETE", ToolMetadata::write()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Metadata { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::new();
        let reply = registry
            .dispatch("no.such.GET", Map::new(), &InvocationContext::anonymous())
            .await;
        assert_eq!(reply.code(), Some("EXECUTION_ERROR"));
    }
}
