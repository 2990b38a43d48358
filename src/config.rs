//! TOML configuration: where the toolbox lives and which agents to build.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;
use crate::profiles;
use crate::toolbox::RetryPolicy;

pub const DEFAULT_TOOLBOX_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub toolbox: ToolboxConfig,
    /// Defaults to the built-in profiles when the file declares none.
    #[serde(default = "profiles::builtin")]
    pub agents: Vec<AgentProfile>,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, AgentError> {
        let config: Self =
            toml::from_str(s).map_err(|e| AgentError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Agent names must be non-blank and unique, since [`Config::agent`] looks them up by name.
    pub fn validate(&self) -> Result<(), AgentError> {
        let mut seen = BTreeSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(AgentError::Configuration("agent name must not be empty".into()));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(AgentError::Configuration(format!(
                    "duplicate agent name {:?}",
                    agent.name
                )));
            }
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| AgentError::Configuration(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Look up an agent profile by name.
    pub fn agent(&self, name: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            toolbox: ToolboxConfig::default(),
            agents: profiles::builtin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolboxConfig {
    pub url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
    pub headers: BTreeMap<String, String>,
    /// Auth service name to token.
    pub auth_tokens: BTreeMap<String, String>,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TOOLBOX_URL.into(),
            timeout_secs: 30,
            retry: RetryPolicy::default(),
            headers: BTreeMap::new(),
            auth_tokens: BTreeMap::new(),
        }
    }
}

/// Static half of an agent: everything except the resolved tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instruction: String,
    /// Catalog toolset to bind. `None` loads the server's default toolset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolset: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bound_params: BTreeMap<String, Value>,
}
