use uuid::Uuid;

use crate::error::ToolError;

/// Authenticated caller.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub team_id: Option<i64>,
    pub name: String,
}

/// Ambient data passed to every tool invocation. Created per request and
/// discarded after the response is serialized.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub principal: Option<Principal>,
    pub team_id: Option<i64>,
    pub request_id: String,
}

impl InvocationContext {
    pub fn new(principal: Principal, team_id: Option<i64>) -> Self {
        InvocationContext {
            team_id: team_id.or(principal.team_id),
            principal: Some(principal),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn anonymous() -> Self {
        InvocationContext {
            principal: None,
            team_id: None,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// The authenticated principal, or `AUTH_ERROR`. This check strictly
    /// precedes validation, resolution and authorization.
    pub fn principal(&self) -> Result<&Principal, ToolError> {
        self.principal.as_ref().ok_or(ToolError::Auth)
    }
}
