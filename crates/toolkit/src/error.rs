use thiserror::Error;

use crate::store::StoreError;

/// Terminal, non-retryable failure of a tool invocation.
///
/// Nothing is thrown across the tool boundary: every variant maps to a
/// machine-readable code plus a complete human-readable sentence. The code is
/// the only part meant for programmatic branching.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("No authenticated user is attached to this request.")]
    Auth,
    #[error("{0}")]
    Validation(String),
    #[error("{label} {id} was not found.")]
    NotFound {
        kind: &'static str,
        label: &'static str,
        id: i64,
    },
    #[error("{0}")]
    AccessDenied(String),
    #[error("{0}")]
    DuplicateKey(String),
    #[error("{0}")]
    ContentExists(String),
    #[error("{0}")]
    NoTextContent(String),
    #[error("{0}")]
    BudgetExceeded(String),
    #[error("{0}")]
    Execution(String),
}

impl ToolError {
    pub fn not_found(kind: &'static str, label: &'static str, id: i64) -> Self {
        ToolError::NotFound { kind, label, id }
    }

    pub fn required(field: &str) -> Self {
        ToolError::Validation(format!("The field '{field}' is required."))
    }

    /// Machine-readable error code. Not-found codes are per-entity
    /// (`BRAND_NOT_FOUND`, `CI_COLOR_NOT_FOUND`, ...), never generic.
    pub fn code(&self) -> String {
        match self {
            ToolError::Auth => "AUTH_ERROR".to_string(),
            ToolError::Validation(_) => "VALIDATION_ERROR".to_string(),
            ToolError::NotFound { kind, .. } => format!("{}_NOT_FOUND", kind.to_uppercase()),
            ToolError::AccessDenied(_) => "ACCESS_DENIED".to_string(),
            ToolError::DuplicateKey(_) => "DUPLICATE_KEY".to_string(),
            ToolError::ContentExists(_) => "CONTENT_EXISTS".to_string(),
            ToolError::NoTextContent(_) => "NO_TEXT_CONTENT".to_string(),
            ToolError::BudgetExceeded(_) => "BUDGET_EXCEEDED".to_string(),
            ToolError::Execution(_) => "EXECUTION_ERROR".to_string(),
        }
    }
}

impl From<StoreError> for ToolError {
    fn from(err: StoreError) -> Self {
        ToolError::Execution(format!("Storage operation failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_codes_are_entity_specific() {
        let err = ToolError::not_found("ci_color", "CI color", 7);
        assert_eq!(err.code(), "CI_COLOR_NOT_FOUND");
        assert_eq!(err.to_string(), "CI color 7 was not found.");
    }

    #[test]
    fn test_messages_are_full_sentences() {
        assert_eq!(
            ToolError::required("name").to_string(),
            "The field 'name' is required."
        );
        assert_eq!(ToolError::Auth.code(), "AUTH_ERROR");
    }
}
