use std::sync::Arc;

use tracing::warn;

use crate::cache::CacheInvalidator;
use crate::config::ToolkitConfig;
use crate::context::Principal;
use crate::error::ToolError;
use crate::gate::{Action, AuthSubject, AuthorizationGate};
use crate::store::{EntityStore, Repo};

/// Shared collaborators handed to every tool at construction time (explicit
/// dependency injection, no ad-hoc service lookups per call).
pub struct ToolRuntime {
    pub store: Arc<dyn EntityStore>,
    pub gate: Arc<dyn AuthorizationGate>,
    pub cache: Arc<dyn CacheInvalidator>,
    pub config: ToolkitConfig,
}

impl ToolRuntime {
    pub fn new(
        store: Arc<dyn EntityStore>,
        gate: Arc<dyn AuthorizationGate>,
        cache: Arc<dyn CacheInvalidator>,
        config: ToolkitConfig,
    ) -> Arc<Self> {
        Arc::new(ToolRuntime {
            store,
            gate,
            cache,
            config,
        })
    }

    pub fn repo(&self) -> Repo<'_> {
        Repo::new(self.store.as_ref())
    }

    /// Run the gate and convert a denial right here, so it reaches the caller
    /// as `ACCESS_DENIED` and never as a generic execution error.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        subject: &AuthSubject,
    ) -> Result<(), ToolError> {
        match self.gate.authorize(principal, action, subject).await {
            Ok(()) => Ok(()),
            Err(denied) => {
                warn!(
                    principal = principal.id,
                    action = action.as_str(),
                    subject = subject.kind,
                    subject_id = subject.id,
                    "access denied"
                );
                Err(ToolError::AccessDenied(denied.reason))
            }
        }
    }
}
