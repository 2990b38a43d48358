//! The two stock agents: BigQuery hotels and Google Cloud release notes.

use crate::config::AgentProfile;
use crate::error::AgentError;
use crate::toolbox::ToolboxClient;
use crate::{build_agent, AgentDefinition};

pub const HOTEL_AGENT: &str = "gcp_hotel_agent";
pub const RELEASE_NOTES_AGENT: &str = "gcp_releasenotes_agent";

pub fn hotel_agent_profile() -> AgentProfile {
    AgentProfile {
        name: HOTEL_AGENT.into(),
        model: "gemini-2.5-flash".into(),
        description: "Agent to answer questions about hotels in BigQuery.".into(),
        instruction: "You are a helpful agent who can answer user questions about hotels \
                      in BigQuery. Use the tools to answer the question"
            .into(),
        toolset: Some("my-toolset".into()),
        bound_params: Default::default(),
    }
}

pub fn release_notes_agent_profile() -> AgentProfile {
    AgentProfile {
        name: RELEASE_NOTES_AGENT.into(),
        model: "gemini-2.0-flash".into(),
        description: "Agent to answer questions about Google Cloud Release notes.".into(),
        instruction: "You are a helpful agent who can answer user questions about the \
                      Google Cloud Release notes. Use the tools to answer the question"
            .into(),
        toolset: Some("my_bq_toolset".into()),
        bound_params: Default::default(),
    }
}

pub fn builtin() -> Vec<AgentProfile> {
    vec![hotel_agent_profile(), release_notes_agent_profile()]
}

pub async fn hotel_agent(client: &ToolboxClient) -> Result<AgentDefinition, AgentError> {
    build_agent(client, &hotel_agent_profile()).await
}

pub async fn release_notes_agent(client: &ToolboxClient) -> Result<AgentDefinition, AgentError> {
    build_agent(client, &release_notes_agent_profile()).await
}
