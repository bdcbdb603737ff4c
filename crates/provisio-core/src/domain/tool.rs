//! Tool catalog types harvested from a provider's `tools/list` response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Placeholder used when a provider lists a tool without a name.
pub const UNNAMED_TOOL: &str = "unnamed_tool";

/// A tool exposed by a provider.
///
/// An immutable snapshot: it can go stale if the provider changes and is
/// replaced wholesale on every successful re-validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: InputSchema,
}

/// JSON-schema subset describing a tool's arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type", default = "object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

fn object_type() -> String {
    "object".to_string()
}

impl Default for InputSchema {
    fn default() -> Self {
        Self {
            schema_type: object_type(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

/// Schema of a single tool argument.
///
/// `type` may be a string or a list of strings in the wild. Keywords this
/// crate does not interpret are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PropertySchema {
    /// Declared type names, in order.
    pub fn declared_types(&self) -> Vec<&str> {
        match &self.schema_type {
            Some(Value::String(t)) => vec![t.as_str()],
            Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: InputSchema::default(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a property to the input schema.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, ty: &str, required: bool) -> Self {
        let name = name.into();
        if required {
            self.input_schema.required.push(name.clone());
        }
        self.input_schema.properties.insert(
            name,
            PropertySchema {
                schema_type: Some(Value::String(ty.to_string())),
                ..PropertySchema::default()
            },
        );
        self
    }

    /// Build a descriptor from one entry of a `tools/list` result.
    ///
    /// Never fails: a missing name becomes [`UNNAMED_TOOL`] and a schema that
    /// does not parse falls back to an empty object schema.
    pub fn from_wire(value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED_TOOL)
            .to_string();
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let input_schema = value
            .get("inputSchema")
            .cloned()
            .and_then(|schema| serde_json::from_value(schema).ok())
            .unwrap_or_default();

        Self {
            name,
            description,
            input_schema,
        }
    }

    /// Parse the `tools` array of a `tools/list` result.
    pub fn list_from_wire(result: &Value) -> Vec<Self> {
        result
            .get("tools")
            .and_then(Value::as_array)
            .map(|tools| tools.iter().map(Self::from_wire).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_name_gets_placeholder() {
        let tools = ToolDescriptor::list_from_wire(&json!({
            "tools": [{"name": "a"}, {"description": "no name"}]
        }));
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "a");
        assert_eq!(tools[1].name, UNNAMED_TOOL);
        assert_eq!(tools[1].description, "no name");
    }

    #[test]
    fn test_schema_parsed_with_unknown_keywords() {
        let tool = ToolDescriptor::from_wire(&json!({
            "name": "weather",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "City", "minLength": 1},
                    "units": {"type": ["string", "null"]}
                },
                "required": ["city"]
            }
        }));
        let city = &tool.input_schema.properties["city"];
        assert_eq!(city.declared_types(), vec!["string"]);
        assert_eq!(city.extra["minLength"], 1);
        assert_eq!(
            tool.input_schema.properties["units"].declared_types(),
            vec!["string", "null"]
        );
        assert_eq!(tool.input_schema.required, vec!["city".to_string()]);
    }

    #[test]
    fn test_bad_schema_falls_back() {
        let tool = ToolDescriptor::from_wire(&json!({"name": "x", "inputSchema": "nope"}));
        assert_eq!(tool.input_schema, InputSchema::default());
    }

    #[test]
    fn test_missing_tools_array_is_empty() {
        assert!(ToolDescriptor::list_from_wire(&json!({})).is_empty());
    }
}
