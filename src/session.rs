//! MCP session state.
//!
//! Holds the backend clients built from the startup configuration. Tool calls
//! borrow the session immutably, so concurrent calls share nothing mutable.

use crate::client::JoeApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::relay::AgentClient;

/// Backend handles shared by every tool call.
#[derive(Debug, Clone)]
pub struct McpSession {
    api: JoeApiClient,
    agent: AgentClient,
}

impl McpSession {
    /// Create a session from the runtime configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            api: JoeApiClient::new(config)?,
            agent: AgentClient::new(config)?,
        })
    }

    /// JoeAPI REST client.
    pub fn api(&self) -> &JoeApiClient {
        &self.api
    }

    /// Async-agent streaming client.
    pub fn agent(&self) -> &AgentClient {
        &self.agent
    }
}
