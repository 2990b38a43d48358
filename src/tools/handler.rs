use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ToolboxError;

/// A callable tool as seen by an agent: identity, model-facing schema, invocation.
#[async_trait]
pub trait ToolDescriptor: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments the model is expected to supply.
    fn input_schema(&self) -> Value;

    async fn invoke(&self, args: &Value) -> Result<String, ToolboxError>;

    /// Function declaration in the Gemini shape: name, description, parameters.
    fn declaration(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": self.input_schema(),
        })
    }
}
