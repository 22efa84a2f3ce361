//! Conversion utilities between MCP tool arguments/results and backend calls.
//!
//! Tool arguments are parsed into per-tool parameter records; backend outcomes
//! are turned into the MCP text envelope.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{ApiResult, McpError, Result};
use crate::tools::ToolOutput;

/// Page used when the caller omits `page`.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the caller omits `limit`.
pub const DEFAULT_LIMIT: u64 = 5;
/// Largest page size forwarded to the backend.
pub const MAX_LIMIT: u64 = 10;

/// Parse tool arguments into a parameter record.
pub fn parse_args<T: DeserializeOwned>(args: Map<String, JsonValue>) -> Result<T> {
    serde_json::from_value(JsonValue::Object(args)).map_err(|e| McpError::InvalidArgs(e.to_string()))
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// Pagination arguments shared by listing tools.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageArgs {
    #[serde(default = "default_page")]
    page: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

impl PageArgs {
    /// Requested page, at least 1.
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    /// Requested page size, clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_LIMIT)
    }
}

/// Drop blank optional filters so they are not sent as empty parameters.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Wrap a backend outcome in the MCP tool envelope.
pub fn result_to_output(result: ApiResult) -> ToolOutput {
    match result {
        Ok(body) => ToolOutput::json(&body),
        Err(err) => ToolOutput::error(err.to_string()),
    }
}

/// Wrap an aggregate document in the MCP tool envelope.
pub fn document_to_output(doc: Map<String, JsonValue>) -> ToolOutput {
    ToolOutput::json(&JsonValue::Object(doc))
}
