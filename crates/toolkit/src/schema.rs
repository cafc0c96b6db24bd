use serde_json::{Map, Value, json};

use crate::metadata::ToolMetadata;
use crate::name::ToolName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl PropType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropType::String => "string",
            PropType::Integer => "integer",
            PropType::Number => "number",
            PropType::Boolean => "boolean",
            PropType::Array => "array",
            PropType::Object => "object",
        }
    }
}

/// One declared argument of a tool schema.
///
/// Field order is meaningful: the validator checks properties in declaration
/// order and fails fast on the first violation.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: &'static str,
    pub prop_type: PropType,
    pub description: &'static str,
    pub enum_values: Option<&'static [&'static str]>,
    pub items: Option<PropType>,
    /// Treat `0` / `"0"` as "not provided" for this field (team_id style).
    pub zero_means_unset: bool,
}

impl PropertySpec {
    pub fn new(name: &'static str, prop_type: PropType, description: &'static str) -> Self {
        PropertySpec {
            name,
            prop_type,
            description,
            enum_values: None,
            items: None,
            zero_means_unset: false,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, PropType::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, PropType::Integer, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, PropType::Boolean, description)
    }

    pub fn enumerated(
        name: &'static str,
        description: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        let mut spec = Self::new(name, PropType::String, description);
        spec.enum_values = Some(values);
        spec
    }

    pub fn unset_on_zero(mut self) -> Self {
        self.zero_means_unset = true;
        self
    }

    fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), json!(self.prop_type.as_str()));
        obj.insert("description".into(), json!(self.description));
        if let Some(values) = self.enum_values {
            obj.insert("enum".into(), json!(values));
        }
        if let Some(items) = self.items {
            obj.insert("items".into(), json!({ "type": items.as_str() }));
        }
        Value::Object(obj)
    }
}

/// JSON-schema-shaped argument declaration consumed by the validator and
/// exported verbatim to the hosting dispatcher.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub properties: Vec<PropertySpec>,
    pub required: Vec<&'static str>,
}

impl ToolSchema {
    pub fn new(properties: Vec<PropertySpec>, required: Vec<&'static str>) -> Self {
        ToolSchema {
            properties,
            required,
        }
    }

    pub fn empty() -> Self {
        ToolSchema {
            properties: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn to_json(&self) -> Value {
        let mut props = Map::new();
        for spec in &self.properties {
            props.insert(spec.name.to_string(), spec.to_json());
        }
        json!({
            "type": "object",
            "properties": props,
            "required": self.required,
        })
    }
}

/// Static per-tool metadata: name, REST-style description, argument schema
/// and dispatch metadata.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: ToolName,
    pub description: String,
    pub schema: ToolSchema,
    pub metadata: ToolMetadata,
}

impl ToolDescriptor {
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name.to_string(),
            "description": self.description,
            "schema": self.schema.to_json(),
            "metadata": self.metadata,
        })
    }
}
