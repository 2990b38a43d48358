use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::retry::RetryPolicy;
use crate::error::ToolboxError;
use crate::types::ManifestSchema;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP plumbing shared by a client and every tool it loads.
#[derive(Clone)]
pub(crate) struct Transport {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) timeout: Duration,
    pub(crate) retry: RetryPolicy,
}

impl Transport {
    pub(crate) fn new(endpoint: &str) -> Result<Self, ToolboxError> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: parse_endpoint(endpoint)?,
            headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        })
    }

    /// Fetch a manifest, retrying transient failures per the retry policy.
    pub(crate) async fn manifest(
        &self,
        segments: &[&str],
        kind: &'static str,
        name: &str,
    ) -> Result<ManifestSchema, ToolboxError> {
        let url = self.endpoint(segments)?;
        let mut attempt = 0;
        loop {
            match self.fetch_manifest(&url, kind, name).await {
                Ok(manifest) => return Ok(manifest),
                Err(e) if e.is_transient() && self.retry.allows(attempt) => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "manifest request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_manifest(
        &self,
        url: &Url,
        kind: &'static str,
        name: &str,
    ) -> Result<ManifestSchema, ToolboxError> {
        debug!(%url, "fetching manifest");
        let resp = self
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| self.map_request_error(e))?;
        check_status(status, &text, kind, name)?;

        serde_json::from_str(&text).map_err(|e| ToolboxError::Protocol(e.to_string()))
    }

    /// POST a tool invocation. Never retried.
    pub(crate) async fn invoke(
        &self,
        tool: &str,
        payload: &Value,
        auth_tokens: &BTreeMap<String, String>,
    ) -> Result<String, ToolboxError> {
        let url = self.endpoint(&["api", "tool", tool, "invoke"])?;
        let mut req = self.request(Method::POST, url).json(payload);
        for (service, token) in auth_tokens {
            req = req.header(auth_header(service), token.as_str());
        }

        let resp = req.send().await.map_err(|e| self.map_request_error(e))?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(|e| self.map_request_error(e))?;
        check_status(status, &text, "tool", tool)?;

        let parsed: Value =
            serde_json::from_str(&text).map_err(|e| ToolboxError::Protocol(e.to_string()))?;
        match parsed.get("result") {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Null) | None => Err(ToolboxError::Protocol(
                "invoke response has no result".into(),
            )),
            Some(other) => Ok(other.to_string()),
        }
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let mut req = self.client.request(method, url).timeout(self.timeout);
        for (name, value) in &self.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        req
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ToolboxError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ToolboxError::InvalidEndpoint {
                url: self.base_url.to_string(),
                reason: "cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn map_request_error(&self, e: reqwest::Error) -> ToolboxError {
        if e.is_timeout() {
            ToolboxError::Timeout(self.timeout)
        } else if e.is_builder() || e.is_decode() {
            ToolboxError::Protocol(e.to_string())
        } else {
            ToolboxError::Connection(e.to_string())
        }
    }
}

/// Header carrying the token for an auth service.
pub(crate) fn auth_header(service: &str) -> String {
    format!("{service}_token")
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ToolboxError> {
    let url = Url::parse(endpoint).map_err(|e| ToolboxError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ToolboxError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

fn check_status(status: u16, body: &str, kind: &'static str, name: &str) -> Result<(), ToolboxError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(ToolboxError::NotFound {
            kind,
            name: name.to_string(),
        }),
        _ => Err(ToolboxError::Api {
            status,
            body: body.to_string(),
        }),
    }
}
