use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ToolError;

/// Normalized outcome of a tool invocation: exactly one of a payload map or
/// an error code. All timestamps inside `data` are RFC3339 strings.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolReply {
    Ok {
        message: String,
        data: Map<String, Value>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ToolReply {
    pub fn ok(message: impl Into<String>, data: Map<String, Value>) -> Self {
        ToolReply::Ok {
            message: message.into(),
            data,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ToolReply::Ok { .. })
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ToolReply::Ok { .. } => None,
            ToolReply::Error { code, .. } => Some(code),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ToolReply::Ok { message, .. } | ToolReply::Error { message, .. } => message,
        }
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self {
            ToolReply::Ok { data, .. } => Some(data),
            ToolReply::Error { .. } => None,
        }
    }
}

impl From<ToolError> for ToolReply {
    fn from(err: ToolError) -> Self {
        ToolReply::Error {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_carries_payload_or_error_never_both() {
        let mut data = Map::new();
        data.insert("id".into(), json!(1));
        let ok = ToolReply::ok("Brand 'Acme' was created.", data);
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("code").is_none());

        let err: ToolReply = ToolError::Auth.into();
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "AUTH_ERROR");
        assert!(value.get("data").is_none());
    }
}
