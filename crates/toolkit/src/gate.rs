use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::context::Principal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Resolved authorization subject. Decoupled from the literal request target:
/// nested entities pass their parent record here (a content block text is
/// authorized via its content board).
#[derive(Debug, Clone)]
pub struct AuthSubject {
    pub kind: &'static str,
    pub id: i64,
    pub team_id: Option<i64>,
}

#[derive(Debug, Error, Clone)]
#[error("{reason}")]
pub struct Denied {
    pub reason: String,
}

impl Denied {
    pub fn new(reason: impl Into<String>) -> Self {
        Denied {
            reason: reason.into(),
        }
    }
}

/// Policy backend seam. Implementations may block on I/O; callers convert a
/// denial to `ACCESS_DENIED` at the check site so it never surfaces as a
/// generic execution error.
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        subject: &AuthSubject,
    ) -> Result<(), Denied>;
}

/// Default gate: a principal may act on a subject when both belong to the
/// same team. Individual principals can additionally have actions revoked.
#[derive(Debug, Default)]
pub struct TeamScopedGate {
    revoked: HashMap<i64, HashSet<Action>>,
}

impl TeamScopedGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(mut self, principal_id: i64, action: Action) -> Self {
        self.revoked.entry(principal_id).or_default().insert(action);
        self
    }
}

#[async_trait]
impl AuthorizationGate for TeamScopedGate {
    async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        subject: &AuthSubject,
    ) -> Result<(), Denied> {
        if self
            .revoked
            .get(&principal.id)
            .is_some_and(|actions| actions.contains(&action))
        {
            warn!(
                principal = principal.id,
                action = action.as_str(),
                subject = subject.kind,
                subject_id = subject.id,
                "authorization revoked"
            );
            return Err(Denied::new(format!(
                "You are not allowed to {} this {}.",
                action.as_str(),
                subject.kind.replace('_', " ")
            )));
        }
        if let Some(team) = subject.team_id
            && principal.team_id != Some(team)
        {
            warn!(
                principal = principal.id,
                action = action.as_str(),
                subject = subject.kind,
                subject_id = subject.id,
                "cross-team access denied"
            );
            return Err(Denied::new(format!(
                "You are not allowed to {} this {} because it belongs to another team.",
                action.as_str(),
                subject.kind.replace('_', " ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(id: i64, team: i64) -> Principal {
        Principal {
            id,
            team_id: Some(team),
            name: format!("user-{id}"),
        }
    }

    #[tokio::test]
    async fn test_same_team_is_allowed() {
        let gate = TeamScopedGate::new();
        let subject = AuthSubject {
            kind: "brand",
            id: 1,
            team_id: Some(9),
        };
        assert!(
            gate.authorize(&principal(1, 9), Action::Update, &subject)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_cross_team_is_denied() {
        let gate = TeamScopedGate::new();
        let subject = AuthSubject {
            kind: "brand",
            id: 1,
            team_id: Some(9),
        };
        let denied = gate
            .authorize(&principal(1, 4), Action::View, &subject)
            .await
            .unwrap_err();
        assert!(denied.reason.contains("another team"));
    }

    #[tokio::test]
    async fn test_revoked_action_is_denied() {
        let gate = TeamScopedGate::new().revoke(2, Action::Delete);
        let subject = AuthSubject {
            kind: "ci_color",
            id: 3,
            team_id: Some(9),
        };
        assert!(
            gate.authorize(&principal(2, 9), Action::Delete, &subject)
                .await
                .is_err()
        );
        assert!(
            gate.authorize(&principal(2, 9), Action::View, &subject)
                .await
                .is_ok()
        );
    }
}
