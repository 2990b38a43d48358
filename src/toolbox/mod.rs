//! Client for the toolbox catalog service.
//!
//! A [`ToolboxClient`] resolves toolset names into [`Toolset`]s of
//! [`RemoteTool`]s. Loading is all-or-nothing: any failure surfaces to the
//! caller and no partial toolset is returned.

pub mod retry;
pub(crate) mod transport;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ToolboxConfig;
use crate::error::ToolboxError;
use crate::tools::{RemoteTool, Toolset};
use crate::types::{ManifestSchema, ToolSchema};

pub use retry::RetryPolicy;
pub use transport::DEFAULT_TIMEOUT;

use transport::Transport;

/// Per-load settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Parameter values fixed for every invocation of the loaded tools.
    pub bound_params: BTreeMap<String, Value>,
    pub cancel: Option<CancellationToken>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bound_params.insert(name.into(), value.into());
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Connection to a toolbox server. Cheap to clone.
#[derive(Clone)]
pub struct ToolboxClient {
    transport: Arc<Transport>,
    auth_tokens: BTreeMap<String, String>,
}

impl ToolboxClient {
    pub fn new(endpoint: &str) -> Result<Self, ToolboxError> {
        Ok(Self {
            transport: Arc::new(Transport::new(endpoint)?),
            auth_tokens: BTreeMap::new(),
        })
    }

    pub fn from_config(config: &ToolboxConfig) -> Result<Self, ToolboxError> {
        let mut client = Self::new(&config.url)?
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_retry(config.retry.clone());
        for (name, value) in &config.headers {
            client = client.with_header(name, value);
        }
        for (service, token) in &config.auth_tokens {
            client = client.with_auth_token(service, token);
        }
        Ok(client)
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        Arc::make_mut(&mut self.transport).client = client;
        self
    }

    /// Header sent with every request to the server.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.transport)
            .headers
            .insert(name.into(), value.into());
        self
    }

    /// Token for an auth service, sent only to tools that declare the service.
    pub fn with_auth_token(mut self, service: impl Into<String>, token: impl Into<String>) -> Self {
        self.auth_tokens.insert(service.into(), token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        Arc::make_mut(&mut self.transport).timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        Arc::make_mut(&mut self.transport).retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        self.transport.base_url.as_str()
    }

    /// Load the toolset registered under `name`.
    pub async fn load_toolset(&self, name: &str) -> Result<Toolset, ToolboxError> {
        self.load_toolset_with(name, &LoadOptions::default()).await
    }

    pub async fn load_toolset_with(
        &self,
        name: &str,
        opts: &LoadOptions,
    ) -> Result<Toolset, ToolboxError> {
        if name.is_empty() {
            return Err(ToolboxError::EmptyToolsetName);
        }
        let manifest = self
            .fetch(&["api", "toolset", name], "toolset", name, opts)
            .await?;
        self.build_toolset(Toolset::named(name), manifest, opts)
    }

    /// Load every tool the server knows about.
    pub async fn load_default_toolset(&self) -> Result<Toolset, ToolboxError> {
        self.load_default_toolset_with(&LoadOptions::default()).await
    }

    pub async fn load_default_toolset_with(
        &self,
        opts: &LoadOptions,
    ) -> Result<Toolset, ToolboxError> {
        let manifest = self
            .fetch(&["api", "toolset", ""], "toolset", "default", opts)
            .await?;
        self.build_toolset(Toolset::new(), manifest, opts)
    }

    /// Load a single tool by name.
    pub async fn load_tool(&self, name: &str) -> Result<RemoteTool, ToolboxError> {
        self.load_tool_with(name, &LoadOptions::default()).await
    }

    pub async fn load_tool_with(
        &self,
        name: &str,
        opts: &LoadOptions,
    ) -> Result<RemoteTool, ToolboxError> {
        if name.is_empty() {
            return Err(ToolboxError::EmptyToolName);
        }
        let mut manifest = self.fetch(&["api", "tool", name], "tool", name, opts).await?;
        check_bindings(&manifest, opts)?;
        let schema = manifest.tools.remove(name).ok_or_else(|| {
            ToolboxError::Protocol(format!("manifest does not describe tool {name}"))
        })?;
        info!(tool = name, server_version = %manifest.server_version, "loaded tool");
        Ok(self.remote_tool(name.to_string(), schema, opts))
    }

    async fn fetch(
        &self,
        segments: &[&str],
        kind: &'static str,
        name: &str,
        opts: &LoadOptions,
    ) -> Result<ManifestSchema, ToolboxError> {
        let request = self.transport.manifest(segments, kind, name);
        match opts.cancel {
            Some(ref cancel) => {
                if cancel.is_cancelled() {
                    return Err(ToolboxError::Cancelled);
                }
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!(kind, name, "load cancelled");
                        Err(ToolboxError::Cancelled)
                    }
                    result = request => result,
                }
            }
            None => request.await,
        }
    }

    fn build_toolset(
        &self,
        mut toolset: Toolset,
        manifest: ManifestSchema,
        opts: &LoadOptions,
    ) -> Result<Toolset, ToolboxError> {
        check_bindings(&manifest, opts)?;
        for (name, schema) in manifest.tools {
            toolset.push(Arc::new(self.remote_tool(name, schema, opts)));
        }
        info!(
            toolset = toolset.name().unwrap_or("default"),
            tools = toolset.len(),
            server_version = %manifest.server_version,
            "loaded toolset"
        );
        Ok(toolset)
    }

    fn remote_tool(
        &self,
        name: String,
        schema: ToolSchema,
        opts: &LoadOptions,
    ) -> RemoteTool {
        RemoteTool::new(
            name,
            schema,
            Arc::clone(&self.transport),
            &opts.bound_params,
            &self.auth_tokens,
        )
    }
}

impl fmt::Debug for ToolboxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolboxClient")
            .field("endpoint", &self.endpoint())
            .field("timeout", &self.transport.timeout)
            .field("auth_services", &self.auth_tokens.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Every bound parameter must be declared by at least one tool in the manifest.
fn check_bindings(manifest: &ManifestSchema, opts: &LoadOptions) -> Result<(), ToolboxError> {
    for key in opts.bound_params.keys() {
        let used = manifest
            .tools
            .values()
            .any(|t| t.parameters.iter().any(|p| &p.name == key));
        if !used {
            return Err(ToolboxError::UnusedBinding(key.clone()));
        }
    }
    Ok(())
}
