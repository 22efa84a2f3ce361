//! Tool registry and category definitions.
//!
//! Provides the infrastructure for registering and dispatching MCP tools.

pub mod agent;
pub mod clients;
pub mod comments;
pub mod financials;
pub mod projects;
pub mod proposals;
pub mod search;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::notify::ProgressSink;
use crate::session::McpSession;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "list_clients")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Result of a tool call, as returned in the MCP `content` array.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Pretty-printed JSON on success, a diagnostic message on failure
    pub text: String,
    /// Set when the backend call failed
    pub is_error: bool,
}

impl ToolOutput {
    /// A successful result carrying `value` as JSON text.
    pub fn json(value: &JsonValue) -> Self {
        Self {
            text: serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string()),
            is_error: false,
        }
    }

    /// A failed result carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            text: message.into(),
            is_error: true,
        }
    }

    /// The MCP `tools/call` result object.
    pub fn to_json(&self) -> JsonValue {
        serde_json::json!({
            "content": [{
                "type": "text",
                "text": self.text
            }],
            "isError": self.is_error
        })
    }
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut tools = Vec::new();

        // Register all tool categories
        tools.extend(clients::tools());
        tools.extend(proposals::tools());
        tools.extend(projects::tools());
        tools.extend(comments::tools());
        tools.extend(financials::tools());
        tools.extend(search::tools());
        tools.extend(agent::tools());

        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler.
    ///
    /// `progress` is only used by long-running tools.
    pub async fn dispatch(
        &self,
        session: &McpSession,
        name: &str,
        args: Map<String, JsonValue>,
        progress: Option<&ProgressSink>,
    ) -> Result<ToolOutput> {
        match name {
            "list_clients" | "create_client" | "list_contacts" | "create_contact" => {
                clients::dispatch(session, name, args).await
            }
            "list_proposals" | "create_proposal" | "find_proposal" => {
                proposals::dispatch(session, name, args).await
            }
            "find_project"
            | "get_project_details"
            | "list_schedules"
            | "get_schedule_revisions"
            | "get_estimate_revisions"
            | "assign_supervisor" => projects::dispatch(session, name, args).await,
            "find_action_items" | "list_comments" | "add_comment" | "delete_comment" => {
                comments::dispatch(session, name, args).await
            }
            "get_financials" | "get_transactions" => financials::dispatch(session, name, args).await,
            "search" | "discover_project" => search::dispatch(session, name, args).await,
            "async_agent" => agent::dispatch(session, name, args, progress).await,
            _ => Err(McpError::UnknownTool(name.to_string())),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt),* $(,)? }
    }) => {{
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@type $req_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Object with only optional properties
    (object {
        optional: { $($opt_name:literal : $opt_type:tt),* $(,)? }
    }) => {{
        let mut props = serde_json::Map::new();
        $(props.insert($opt_name.to_string(), schema!(@type $opt_type));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": []
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type number) => { serde_json::json!({"type": "number"}) };
    (@type integer) => { serde_json::json!({"type": "integer"}) };
    (@type page) => { serde_json::json!({"type": "integer", "minimum": 1, "default": 1}) };
    (@type limit) => {
        serde_json::json!({
            "type": "integer",
            "minimum": 1,
            "maximum": $crate::convert::MAX_LIMIT,
            "default": $crate::convert::DEFAULT_LIMIT
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_output_envelope() {
        let ok = ToolOutput::json(&serde_json::json!({"a": 1})).to_json();
        assert_eq!(ok["isError"], false);
        assert_eq!(ok["content"][0]["type"], "text");
        assert_eq!(ok["content"][0]["text"], "{\n  \"a\": 1\n}");

        let err = ToolOutput::error("API error 404: missing").to_json();
        assert_eq!(err["isError"], true);
        assert_eq!(err["content"][0]["text"], "API error 404: missing");
    }

    #[test]
    fn test_schema_macro() {
        let schema = schema!(object {
            required: { "query": string },
            optional: { "limit": limit }
        });
        assert_eq!(schema["required"], serde_json::json!(["query"]));
        assert_eq!(schema["properties"]["limit"]["maximum"], 10);
        assert_eq!(schema["properties"]["limit"]["default"], 5);
    }
}
