pub mod config;
pub mod error;
pub mod profiles;
pub mod toolbox;
pub mod tools;
pub mod types;

use serde_json::Value;
use tracing::info;

pub use config::{AgentProfile, Config, ToolboxConfig};
pub use error::{AgentError, ToolboxError};
pub use toolbox::{LoadOptions, RetryPolicy, ToolboxClient};
pub use tools::{RemoteTool, ToolDescriptor, Toolset};
pub use types::{ManifestSchema, ParameterSchema, ToolSchema};

/// An agent ready to hand to a hosting runtime: identity, model, prompt, tools.
///
/// Immutable once built. The tools are always fully resolved.
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    name: String,
    model: String,
    description: String,
    instruction: String,
    tools: Toolset,
}

impl AgentDefinition {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        description: impl Into<String>,
        instruction: impl Into<String>,
        tools: Toolset,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            description: description.into(),
            instruction: instruction.into(),
            tools,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model identifier. Not validated here; the runtime rejects unknown models.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// System prompt governing the agent.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn tools(&self) -> &Toolset {
        &self.tools
    }

    /// Tool declarations in the Gemini `functionDeclarations` shape.
    pub fn function_declarations(&self) -> Vec<Value> {
        self.tools.declarations()
    }

    /// Dispatch a tool call issued by the model.
    pub async fn invoke_tool(&self, name: &str, args: &Value) -> Result<String, ToolboxError> {
        info!(agent = %self.name, tool = name, "tool call");
        self.tools.invoke(name, args).await
    }
}

/// Resolve the profile's toolset and assemble the agent.
pub async fn build_agent(
    client: &ToolboxClient,
    profile: &AgentProfile,
) -> Result<AgentDefinition, AgentError> {
    build_agent_with(client, profile, LoadOptions::default()).await
}

/// Like [`build_agent`], with caller-supplied load options (e.g. a cancellation
/// token). The profile's bound parameters are added to `opts`.
pub async fn build_agent_with(
    client: &ToolboxClient,
    profile: &AgentProfile,
    mut opts: LoadOptions,
) -> Result<AgentDefinition, AgentError> {
    if profile.name.trim().is_empty() {
        return Err(AgentError::Configuration("agent name must not be empty".into()));
    }

    for (k, v) in &profile.bound_params {
        opts.bound_params.insert(k.clone(), v.clone());
    }

    let tools = match profile.toolset {
        Some(ref name) => client.load_toolset_with(name, &opts).await?,
        None => client.load_default_toolset_with(&opts).await?,
    };

    info!(
        agent = %profile.name,
        model = %profile.model,
        tools = tools.len(),
        "agent ready"
    );
    Ok(AgentDefinition::new(
        profile.name.clone(),
        profile.model.clone(),
        profile.description.clone(),
        profile.instruction.clone(),
        tools,
    ))
}
