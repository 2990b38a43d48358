use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Body of a toolbox manifest response (`/api/toolset/{name}`, `/api/tool/{name}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSchema {
    pub server_version: String,
    /// Keyed by tool name. Iteration order is name-ascending.
    pub tools: BTreeMap<String, ToolSchema>,
}

/// One tool as described by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolSchema {
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
    /// Auth services of which at least one must supply a token to invoke the tool.
    #[serde(default)]
    pub auth_required: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Non-empty means the server fills this parameter from an auth token.
    #[serde(default)]
    pub auth_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ParameterSchema>>,
}

fn default_required() -> bool {
    true
}

impl ParameterSchema {
    pub fn is_authenticated(&self) -> bool {
        !self.auth_sources.is_empty()
    }

    /// JSON Schema fragment for this parameter.
    pub fn json_schema(&self) -> Value {
        let mut schema = json!({ "type": json_type(&self.kind) });
        if !self.description.is_empty() {
            schema["description"] = Value::String(self.description.clone());
        }
        if let Some(ref items) = self.items {
            schema["items"] = items.json_schema();
        }
        schema
    }
}

fn json_type(kind: &str) -> &str {
    match kind {
        "float" => "number",
        "map" => "object",
        other => other,
    }
}

/// Object schema over the given parameters, as handed to a model.
pub fn object_schema<'a>(params: impl IntoIterator<Item = &'a ParameterSchema>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for p in params {
        properties.insert(p.name.clone(), p.json_schema());
        if p.required {
            required.push(Value::String(p.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
