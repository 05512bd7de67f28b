//! Conversion between JSON schemas and flattened tool parameters.

use super::entities::ToolParameter;
use serde_json::{Map, Value};

/// Flatten the top-level `properties` of an object schema.
///
/// Parameters come out sorted by name so the result does not depend on the
/// map ordering of the schema source.
pub fn parameters_from_schema(schema: &Value) -> Vec<ToolParameter> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(|r| r.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) else {
        return Vec::new();
    };

    let mut params: Vec<ToolParameter> = properties
        .iter()
        .map(|(name, prop)| {
            let description = prop
                .get("description")
                .and_then(|d| d.as_str())
                .unwrap_or_default();
            let param_type = prop
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("string");
            ToolParameter::new(name.as_str(), description, required.contains(&name.as_str()))
                .with_type(param_type)
        })
        .collect();
    params.sort_by(|a, b| a.name.cmp(&b.name));
    params
}

/// Build an object schema from a parameter list.
pub fn schema_from_parameters(params: &[ToolParameter]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in params {
        properties.insert(
            param.name.clone(),
            serde_json::json!({
                "type": param.param_type,
                "description": param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    let mut schema = serde_json::json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_from_object_schema() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Resource name"},
                "blueprint": {"type": "string", "description": "Blueprint id"},
                "replicas": {"type": "integer"}
            },
            "required": ["name", "blueprint"]
        });

        let params = parameters_from_schema(&schema);
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["blueprint", "name", "replicas"]);
        assert!(params[0].required);
        assert!(!params[2].required);
        assert_eq!(params[2].param_type, "integer");
        assert_eq!(params[1].description, "Resource name");
    }

    #[test]
    fn schema_without_properties_has_no_parameters() {
        assert!(parameters_from_schema(&serde_json::json!({"type": "object"})).is_empty());
        assert!(parameters_from_schema(&Value::Null).is_empty());
    }

    #[test]
    fn schema_from_parameters_omits_empty_required() {
        let schema = schema_from_parameters(&[ToolParameter::new("q", "query", false)]);
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"]["q"]["type"], "string");
    }
}
