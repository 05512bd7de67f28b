//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Parameter specification for a tool, derived from its input schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// JSON schema type hint (e.g., "string", "number", "object")
    pub param_type: String,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }
}

/// A remotely executed tool as advertised by the tool endpoint.
///
/// Immutable once discovered. The raw `input_schema` is kept alongside the
/// flattened [`ToolParameter`] list because native tool-use backends need
/// the schema verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique name of the tool (e.g., "list_blueprints")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
    /// JSON schema for the tool arguments
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            input_schema: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    /// Build a descriptor from a JSON schema, flattening its top-level
    /// `properties` into [`ToolParameter`]s.
    pub fn from_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        let parameters = super::schema::parameters_from_schema(&input_schema);
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            input_schema,
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self.input_schema = super::schema::schema_from_parameters(&self.parameters);
        self
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

/// Read-only snapshot of the tool catalog.
///
/// Returned by the protocol client's `list_tools` and handed by value to the
/// orchestration loop and every adapter call. Cloning shares the underlying
/// list.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Arc<[ToolDescriptor]>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools: tools.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }
}

impl FromIterator<ToolDescriptor> for ToolCatalog {
    fn from_iter<I: IntoIterator<Item = ToolDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A model's request to run one tool.
///
/// `id` is unique within the turn that produced it; native backends supply
/// their own ids, text-parsed invocations are numbered `call_1`, `call_2`, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: HashMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    pub fn with_arguments(mut self, arguments: HashMap<String, serde_json::Value>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Arguments as a JSON object, the shape sent on the wire.
    pub fn arguments_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.arguments
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lookup_by_name() {
        let catalog = ToolCatalog::new(vec![
            ToolDescriptor::new("list_blueprints", "List blueprints"),
            ToolDescriptor::new("get_resources", "List resources"),
        ]);

        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("get_resources"));
        assert!(!catalog.contains("delete_everything"));
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["list_blueprints", "get_resources"]
        );
    }

    #[test]
    fn catalog_clone_shares_snapshot() {
        let catalog: ToolCatalog = vec![ToolDescriptor::new("a", "")].into_iter().collect();
        let copy = catalog.clone();
        assert!(Arc::ptr_eq(&catalog.tools, &copy.tools));
    }

    #[test]
    fn descriptor_with_parameter_rebuilds_schema() {
        let tool = ToolDescriptor::new("create_resource", "Create a resource")
            .with_parameter(ToolParameter::new("name", "Resource name", true))
            .with_parameter(ToolParameter::new("replicas", "Replica count", false).with_type("integer"));

        assert_eq!(tool.input_schema["properties"]["replicas"]["type"], "integer");
        assert_eq!(tool.input_schema["required"], serde_json::json!(["name"]));
        assert_eq!(tool.required_parameters().count(), 1);
    }

    #[test]
    fn invocation_arguments_json() {
        let call = ToolInvocation::new("call_1", "create_resource").with_arg("name", "my-app");
        assert_eq!(call.arguments_json(), serde_json::json!({"name": "my-app"}));
    }
}
