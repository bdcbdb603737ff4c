//! Tool argument validation against a tool's input schema.
//!
//! Runs before any process is spawned. Returns a structured result and never
//! fails.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{PropertySchema, ToolDescriptor};

/// Outcome of checking caller arguments against a tool schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParameterCheck {
    const fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(error: String) -> Self {
        Self {
            valid: false,
            error: Some(error),
        }
    }
}

/// Check `args` against `tool.input_schema`.
///
/// Every `required` name must be present. Each supplied key declared in
/// `properties` must match its declared type. An empty object supplied for
/// a non-object property counts as omitted.
pub fn validate_parameters(args: &Value, tool: &ToolDescriptor) -> ParameterCheck {
    let empty = Map::new();
    let args = match args {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return ParameterCheck::invalid(format!(
                "Arguments for tool '{}' must be an object, got {}",
                tool.name,
                kind_of(other)
            ));
        }
    };

    let schema = &tool.input_schema;

    for name in &schema.required {
        let omitted = match args.get(name) {
            None => true,
            Some(value) => schema
                .properties
                .get(name)
                .is_some_and(|prop| is_empty_object_placeholder(value, prop)),
        };
        if omitted {
            return ParameterCheck::invalid(format!(
                "Missing required parameter '{name}' for tool '{}'",
                tool.name
            ));
        }
    }

    for (name, value) in args {
        let Some(prop) = schema.properties.get(name) else {
            continue;
        };
        if is_empty_object_placeholder(value, prop) {
            continue;
        }
        let declared = prop.declared_types();
        if declared.is_empty() {
            continue;
        }
        if !declared.iter().any(|ty| matches_type(value, ty)) {
            return ParameterCheck::invalid(format!(
                "Parameter '{name}' for tool '{}' must be of type {}, got {}",
                tool.name,
                declared.join(" | "),
                kind_of(value)
            ));
        }
    }

    ParameterCheck::valid()
}

/// `{}` sent where a non-object type is declared stands in for "omitted".
fn is_empty_object_placeholder(value: &Value, prop: &PropertySchema) -> bool {
    let empty_object = value.as_object().is_some_and(Map::is_empty);
    empty_object && !prop.declared_types().contains(&"object")
}

fn matches_type(value: &Value, ty: &str) -> bool {
    match ty {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        // Unknown type keywords are not enforced.
        _ => true,
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
