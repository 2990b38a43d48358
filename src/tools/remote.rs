use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use super::handler::ToolDescriptor;
use crate::error::ToolboxError;
use crate::toolbox::transport::Transport;
use crate::types::{object_schema, ParameterSchema, ToolSchema};

/// A tool defined by the toolbox catalog and executed by the toolbox server.
///
/// Bound parameters and auth-sourced parameters are hidden from the
/// model-facing schema: bound values are merged into every call, auth
/// parameters are filled server-side from the `{service}_token` headers.
pub struct RemoteTool {
    name: String,
    schema: ToolSchema,
    transport: Arc<Transport>,
    bound_params: BTreeMap<String, Value>,
    auth_tokens: BTreeMap<String, String>,
}

impl fmt::Debug for RemoteTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTool")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("bound_params", &self.bound_params)
            .field("auth_services", &self.auth_tokens.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RemoteTool {
    pub(crate) fn new(
        name: String,
        schema: ToolSchema,
        transport: Arc<Transport>,
        bound_params: &BTreeMap<String, Value>,
        auth_tokens: &BTreeMap<String, String>,
    ) -> Self {
        let bound_params = bound_params
            .iter()
            .filter(|(k, _)| schema.parameters.iter().any(|p| &p.name == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let auth_tokens = auth_tokens
            .iter()
            .filter(|(service, _)| {
                schema.auth_required.contains(*service)
                    || schema
                        .parameters
                        .iter()
                        .any(|p| p.auth_sources.contains(*service))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            name,
            schema,
            transport,
            bound_params,
            auth_tokens,
        }
    }

    /// The catalog's description of this tool.
    pub fn tool_schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub fn bound_params(&self) -> &BTreeMap<String, Value> {
        &self.bound_params
    }

    fn visible_params(&self) -> impl Iterator<Item = &ParameterSchema> {
        self.schema
            .parameters
            .iter()
            .filter(|p| !p.is_authenticated() && !self.bound_params.contains_key(&p.name))
    }

    fn invalid(&self, reason: String) -> ToolboxError {
        ToolboxError::InvalidArguments {
            tool: self.name.clone(),
            reason,
        }
    }

    fn build_payload(&self, args: &Value) -> Result<Value, ToolboxError> {
        let mut payload = match args {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => return Err(self.invalid("arguments must be a JSON object".into())),
        };

        for key in payload.keys() {
            if !self.visible_params().any(|p| &p.name == key) {
                return Err(self.invalid(format!("unexpected argument {key}")));
            }
        }
        for p in self.visible_params().filter(|p| p.required) {
            if !payload.contains_key(&p.name) {
                return Err(self.invalid(format!("missing argument {}", p.name)));
            }
        }

        for (k, v) in &self.bound_params {
            payload.insert(k.clone(), v.clone());
        }
        Ok(Value::Object(payload))
    }

    fn check_auth(&self) -> Result<(), ToolboxError> {
        let has_token =
            |services: &[String]| services.iter().any(|s| self.auth_tokens.contains_key(s));

        for p in self.schema.parameters.iter().filter(|p| p.is_authenticated()) {
            if !has_token(p.auth_sources.as_slice()) {
                return Err(ToolboxError::Unauthenticated {
                    tool: self.name.clone(),
                    services: p.auth_sources.clone(),
                });
            }
        }
        if !self.schema.auth_required.is_empty()
            && !has_token(self.schema.auth_required.as_slice())
        {
            return Err(ToolboxError::Unauthenticated {
                tool: self.name.clone(),
                services: self.schema.auth_required.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ToolDescriptor for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.schema.description
    }

    fn input_schema(&self) -> Value {
        object_schema(self.visible_params())
    }

    async fn invoke(&self, args: &Value) -> Result<String, ToolboxError> {
        let payload = self.build_payload(args)?;
        self.check_auth()?;
        debug!(tool = %self.name, "invoking remote tool");
        self.transport
            .invoke(&self.name, &payload, &self.auth_tokens)
            .await
    }
}
