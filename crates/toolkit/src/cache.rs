use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::name::ToolName;

#[derive(Debug, Error)]
#[error("cache invalidation failed: {0}")]
pub struct CacheError(pub String);

/// Cache-store seam. Cached list views are keyed by (list operation, user,
/// team); invalidation runs only after a successful Create/Update/Delete of
/// a list-visible entity, never after a Get.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(
        &self,
        list_op: &ToolName,
        user_id: i64,
        team_id: Option<i64>,
    ) -> Result<(), CacheError>;
}

/// Best-effort contract made explicit: the fallible result is consumed here
/// with a log line and never surfaced to the caller.
pub async fn invalidate_best_effort(
    invalidator: &dyn CacheInvalidator,
    list_op: &ToolName,
    user_id: i64,
    team_id: Option<i64>,
) {
    if let Err(err) = invalidator.invalidate(list_op, user_id, team_id).await {
        warn!(
            list_op = %list_op,
            user_id,
            team_id,
            error = %err,
            "list cache invalidation failed, continuing"
        );
    }
}

/// Invalidator for deployments without a cache store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

#[async_trait]
impl CacheInvalidator for NoopInvalidator {
    async fn invalidate(
        &self,
        _list_op: &ToolName,
        _user_id: i64,
        _team_id: Option<i64>,
    ) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingInvalidator;

    #[async_trait]
    impl CacheInvalidator for FailingInvalidator {
        async fn invalidate(
            &self,
            _list_op: &ToolName,
            _user_id: i64,
            _team_id: Option<i64>,
        ) -> Result<(), CacheError> {
            Err(CacheError("cache store unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_invalidation_failure_is_swallowed() {
        let list_op = ToolName::parse("brand.brands.GET").unwrap();
        // Must not panic or propagate.
        invalidate_best_effort(&FailingInvalidator, &list_op, 1, Some(2)).await;
        invalidate_best_effort(&NoopInvalidator, &list_op, 1, None).await;
    }
}
