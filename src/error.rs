use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("toolbox error: {0}")]
    Toolbox(#[from] ToolboxError),
    #[error("configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ToolboxError {
    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("toolset name must not be empty")]
    EmptyToolsetName,
    #[error("tool name must not be empty")]
    EmptyToolName,
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },
    #[error("malformed toolbox response: {0}")]
    Protocol(String),
    #[error("toolbox returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("tool {tool} requires a token for one of: {}", .services.join(", "))]
    Unauthenticated { tool: String, services: Vec<String> },
    #[error("bound parameter {0} is not used by any loaded tool")]
    UnusedBinding(String),
    #[error("load cancelled")]
    Cancelled,
}

impl ToolboxError {
    /// Failures worth another attempt: the request may succeed unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            ToolboxError::Connection(_) | ToolboxError::Timeout(_) => true,
            ToolboxError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
