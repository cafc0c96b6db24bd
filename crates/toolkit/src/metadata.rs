use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::name::{ToolName, Verb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Query,
    Action,
}

/// Blast-radius classification consumed by the hosting dispatcher for
/// risk-gating and audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Write,
    Destructive,
}

/// Typed per-tool metadata, validated when the tool is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub category: Category,
    pub read_only: bool,
    pub requires_auth: bool,
    pub requires_team: bool,
    pub risk_level: RiskLevel,
    pub idempotent: bool,
    pub side_effects: BTreeSet<String>,
}

impl ToolMetadata {
    /// Read-only query defaults.
    pub fn query() -> Self {
        ToolMetadata {
            category: Category::Query,
            read_only: true,
            requires_auth: true,
            requires_team: false,
            risk_level: RiskLevel::Safe,
            idempotent: true,
            side_effects: BTreeSet::new(),
        }
    }

    /// Mutating action defaults.
    pub fn write() -> Self {
        ToolMetadata {
            category: Category::Action,
            read_only: false,
            requires_auth: true,
            requires_team: false,
            risk_level: RiskLevel::Write,
            idempotent: false,
            side_effects: BTreeSet::new(),
        }
    }

    /// Delete defaults.
    pub fn destructive() -> Self {
        ToolMetadata {
            risk_level: RiskLevel::Destructive,
            idempotent: true,
            ..Self::write()
        }
    }

    pub fn with_team(mut self) -> Self {
        self.requires_team = true;
        self
    }

    pub fn with_side_effect(mut self, tag: &str) -> Self {
        self.side_effects.insert(tag.to_string());
        self
    }

    /// Registration-time invariants. A violation here is a programming error
    /// in the tool configuration, surfaced before the registry accepts it.
    pub fn validate(&self, name: &ToolName) -> Result<(), String> {
        if self.category == Category::Query && !self.read_only {
            return Err("query tools must be read_only".to_string());
        }
        if self.read_only && self.risk_level != RiskLevel::Safe {
            return Err("read-only tools must be risk_level=safe".to_string());
        }
        match name.verb {
            Verb::Get => {
                if !self.read_only {
                    return Err("GET tools must be read_only".to_string());
                }
            }
            Verb::Post | Verb::Put => {
                if self.read_only {
                    return Err("write tools must have read_only=false".to_string());
                }
            }
            Verb::Delete => {
                if self.read_only {
                    return Err("write tools must have read_only=false".to_string());
                }
                if self.risk_level != RiskLevel::Destructive {
                    return Err("DELETE tools must be risk_level=destructive".to_string());
                }
            }
            Verb::Custom(_) => {}
        }
        if self.requires_team && !self.requires_auth {
            return Err("requires_team implies requires_auth".to_string());
        }
        Ok(())
    }
}
