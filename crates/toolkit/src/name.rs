use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("tool name '{0}' must have exactly three dot-separated segments")]
    Segments(String),
    #[error("tool name segment '{0}' must be lowercase snake_case")]
    Segment(String),
    #[error("tool verb '{0}' must be uppercase (A-Z and underscores)")]
    Verb(String),
}

/// CRUD verb of a tool, or a custom verb such as `FETCH_METRICS` or `RESET`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Custom(String),
}

impl Verb {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        match raw {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "DELETE" => Ok(Verb::Delete),
            other => {
                if !other.is_empty()
                    && other.chars().all(|c| c.is_ascii_uppercase() || c == '_')
                {
                    Ok(Verb::Custom(other.to_string()))
                } else {
                    Err(NameError::Verb(other.to_string()))
                }
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
            Verb::Custom(v) => v,
        }
    }
}

impl From<Verb> for String {
    fn from(v: Verb) -> String {
        v.as_str().to_string()
    }
}

impl TryFrom<String> for Verb {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, NameError> {
        Verb::parse(&s)
    }
}

/// Dotted route-like tool identifier: `<domain>.<resource[_subresource]>.<VERB>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ToolName {
    pub domain: String,
    pub resource: String,
    pub verb: Verb,
}

impl ToolName {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let parts: Vec<&str> = raw.split('.').collect();
        let [domain, resource, verb] = parts.as_slice() else {
            return Err(NameError::Segments(raw.to_string()));
        };
        for segment in [domain, resource] {
            let ok = !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
            if !ok {
                return Err(NameError::Segment(segment.to_string()));
            }
        }
        Ok(ToolName {
            domain: domain.to_string(),
            resource: resource.to_string(),
            verb: Verb::parse(verb)?,
        })
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.domain, self.resource, self.verb.as_str())
    }
}

impl From<ToolName> for String {
    fn from(n: ToolName) -> String {
        n.to_string()
    }
}

impl TryFrom<String> for ToolName {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, NameError> {
        ToolName::parse(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_crud_and_custom_verbs() {
        let name = ToolName::parse("brand.brands.POST").unwrap();
        assert_eq!(name.domain, "brand");
        assert_eq!(name.resource, "brands");
        assert_eq!(name.verb, Verb::Post);

        let name = ToolName::parse("seo.keywords.FETCH_METRICS").unwrap();
        assert_eq!(name.verb, Verb::Custom("FETCH_METRICS".to_string()));
        assert_eq!(name.to_string(), "seo.keywords.FETCH_METRICS");

        let name = ToolName::parse("content.board.EXPORT").unwrap();
        assert_eq!(name.verb, Verb::Custom("EXPORT".to_string()));
    }

    #[test]
    fn test_rejects_malformed_names() {
        assert!(ToolName::parse("brands.POST").is_err());
        assert!(ToolName::parse("brand.Brands.POST").is_err());
        assert!(ToolName::parse("brand.brands.post").is_err());
        assert!(ToolName::parse("brand.brands.").is_err());
        // Custom verbs register in their uppercase canonical form only.
        assert!(ToolName::parse("content.board.export").is_err());
    }
}
