//! Schema validation for raw argument maps.
//!
//! Fail-fast: required presence is checked first, in declaration order, then
//! each present property is type-checked in declaration order; the first
//! violation wins. Coercion is deliberately weak: integers are accepted as
//! numeric strings and booleans as `"true"`/`"false"`, matching what callers
//! already send. Fields flagged `zero_means_unset` normalize `0`/`"0"` to
//! absent before the required check runs.

use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::schema::{PropType, PropertySpec, ToolSchema};

/// Normalized, type-checked arguments produced by [`validate`].
#[derive(Debug, Clone, Default)]
pub struct ValidatedArgs {
    values: Map<String, Value>,
}

impl ValidatedArgs {
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.str(name).map(str::to_string)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn require_str(&self, name: &str) -> Result<&str, ToolError> {
        self.str(name).ok_or_else(|| ToolError::required(name))
    }

    pub fn require_i64(&self, name: &str) -> Result<i64, ToolError> {
        self.i64(name).ok_or_else(|| ToolError::required(name))
    }
}

fn is_unset_zero(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_i64() == Some(0),
        Value::String(s) => s == "0",
        _ => false,
    }
}

fn coerce(spec: &PropertySpec, value: &Value) -> Result<Value, ToolError> {
    if let Some(allowed) = spec.enum_values {
        let Value::String(s) = value else {
            return Err(type_error(spec));
        };
        if !allowed.contains(&s.as_str()) {
            return Err(ToolError::Validation(format!(
                "The field '{}' must be one of: {}.",
                spec.name,
                allowed.join(", ")
            )));
        }
        return Ok(value.clone());
    }
    match spec.prop_type {
        PropType::String => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(type_error(spec)),
        },
        PropType::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| type_error(spec)),
            _ => Err(type_error(spec)),
        },
        PropType::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::from)
                .map_err(|_| type_error(spec)),
            _ => Err(type_error(spec)),
        },
        PropType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s == "true" => Ok(Value::Bool(true)),
            Value::String(s) if s == "false" => Ok(Value::Bool(false)),
            _ => Err(type_error(spec)),
        },
        PropType::Array => match value {
            Value::Array(items) => {
                if let Some(item_type) = spec.items {
                    let item_spec = PropertySpec::new(spec.name, item_type, spec.description);
                    let coerced = items
                        .iter()
                        .map(|item| coerce(&item_spec, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Value::Array(coerced))
                } else {
                    Ok(value.clone())
                }
            }
            _ => Err(type_error(spec)),
        },
        PropType::Object => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(type_error(spec)),
        },
    }
}

fn type_error(spec: &PropertySpec) -> ToolError {
    ToolError::Validation(format!(
        "The field '{}' must be of type {}.",
        spec.name,
        spec.prop_type.as_str()
    ))
}

/// Validate a raw argument map against a tool schema. Unknown keys are
/// ignored; normalized values are returned for every declared, present field.
pub fn validate(schema: &ToolSchema, args: &Map<String, Value>) -> Result<ValidatedArgs, ToolError> {
    let present = |name: &str| -> Option<&Value> {
        let value = args.get(name)?;
        if value.is_null() {
            return None;
        }
        if schema
            .property(name)
            .is_some_and(|spec| spec.zero_means_unset)
            && is_unset_zero(value)
        {
            return None;
        }
        Some(value)
    };

    for name in &schema.required {
        if present(name).is_none() {
            return Err(ToolError::required(name));
        }
    }

    let mut values = Map::new();
    for spec in &schema.properties {
        if let Some(raw) = present(spec.name) {
            values.insert(spec.name.to_string(), coerce(spec, raw)?);
        }
    }
    Ok(ValidatedArgs { values })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema() -> ToolSchema {
        ToolSchema::new(
            vec![
                PropertySpec::string("name", "Display name"),
                PropertySpec::integer("board_id", "Owning board"),
                PropertySpec::integer("team_id", "Owning team").unset_on_zero(),
                PropertySpec::boolean("done", "Completion flag"),
                PropertySpec::enumerated("direction", "Sort direction", &["asc", "desc"]),
            ],
            vec!["name", "board_id"],
        )
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_required_fields_fail_fast_in_declaration_order() {
        let err = validate(&schema(), &args(json!({}))).unwrap_err();
        // 'name' is declared before 'board_id'; only the first miss reports.
        assert_eq!(err.to_string(), "The field 'name' is required.");

        let err = validate(&schema(), &args(json!({"name": "Acme"}))).unwrap_err();
        assert_eq!(err.to_string(), "The field 'board_id' is required.");
    }

    #[test]
    fn test_integer_accepts_numeric_strings() {
        let out = validate(&schema(), &args(json!({"name": "Acme", "board_id": "42"}))).unwrap();
        assert_eq!(out.i64("board_id"), Some(42));

        let err =
            validate(&schema(), &args(json!({"name": "Acme", "board_id": "x"}))).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_zero_means_unset_is_per_field() {
        // team_id: 0 normalizes to absent, board_id: 0 stays present.
        let out = validate(
            &schema(),
            &args(json!({"name": "Acme", "board_id": 0, "team_id": "0"})),
        )
        .unwrap();
        assert_eq!(out.i64("board_id"), Some(0));
        assert!(!out.has("team_id"));
    }

    #[test]
    fn test_empty_string_is_not_treated_as_missing() {
        let out = validate(&schema(), &args(json!({"name": "", "board_id": 1}))).unwrap();
        assert_eq!(out.str("name"), Some(""));
    }

    #[test]
    fn test_enum_requires_exact_match() {
        let err = validate(
            &schema(),
            &args(json!({"name": "A", "board_id": 1, "direction": "ASC"})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("must be one of"));

        let out = validate(
            &schema(),
            &args(json!({"name": "A", "board_id": 1, "direction": "desc"})),
        )
        .unwrap();
        assert_eq!(out.str("direction"), Some("desc"));
    }

    #[test]
    fn test_boolean_coercion() {
        let out = validate(
            &schema(),
            &args(json!({"name": "A", "board_id": 1, "done": "true"})),
        )
        .unwrap();
        assert_eq!(out.bool("done"), Some(true));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let out = validate(
            &schema(),
            &args(json!({"name": "A", "board_id": 1, "bogus": 7})),
        )
        .unwrap();
        assert!(!out.has("bogus"));
    }
}
