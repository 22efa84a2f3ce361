//! Runtime configuration.
//!
//! Built once at startup and handed to the HTTP clients; nothing here is read
//! again while a tool call is running.

use std::time::Duration;

use url::Url;

use crate::error::{McpError, Result};

/// Default JoeAPI base URL.
pub const DEFAULT_BASE_URL: &str = "https://joeapi.fly.dev";

/// Default async-agent streaming endpoint.
pub const DEFAULT_AGENT_URL: &str = "https://joeapi-async-agent.fly.dev/webhooks/prompt-stream";

/// Default per-request timeout for the REST backend.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default wall-clock limit for one async-agent run.
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(360);

/// Backend endpoints, credentials and timeouts.
#[derive(Debug, Clone)]
pub struct Config {
    /// JoeAPI base URL, without the `/api/v1` prefix
    pub base_url: Url,
    /// Bearer token forwarded to JoeAPI
    pub api_key: Option<String>,
    /// Timeout for each REST request
    pub request_timeout: Duration,
    /// Async-agent streaming endpoint
    pub agent_url: Url,
    /// Overall limit for an async-agent run, connection setup included
    pub agent_timeout: Duration,
}

impl Config {
    /// Create a configuration pointing at `base_url` with default settings.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_url("base URL", base_url)?,
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            agent_url: parse_url("agent URL", DEFAULT_AGENT_URL)?,
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
        })
    }

    /// Set the API key. Blank keys are treated as absent.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Set the REST request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the async-agent endpoint.
    pub fn with_agent_url(mut self, agent_url: &str) -> Result<Self> {
        self.agent_url = parse_url("agent URL", agent_url)?;
        Ok(self)
    }

    /// Set the async-agent overall timeout.
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }
}

fn parse_url(what: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| McpError::Config(format!("{} '{}': {}", what, raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(McpError::Config(format!("{} '{}' cannot be a base URL", what, raw)));
    }
    Ok(url)
}
