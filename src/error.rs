//! Error types for the MCP server.
//!
//! `McpError` covers protocol and argument faults that surface as JSON-RPC errors.
//! `ApiError` covers expected backend failures, which are reported inside a tool
//! result with `isError` set instead of failing the request.

use serde_json::Value as JsonValue;

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum McpError {
    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Arguments did not match the tool's parameter record.
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    /// Invalid startup configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArgs(_) => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;

/// Failure of a call against one of the backends.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("API error {status}: {message}")]
    Backend {
        /// HTTP status code, unchanged
        status: u16,
        /// Response body rendered as text
        message: String,
        /// Response body, parsed as JSON when possible
        body: JsonValue,
    },

    /// No response was received (DNS, refused connection, client timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// A 2xx response whose body was not JSON.
    #[error("malformed response: {0}")]
    Parse(String),

    /// A resolution search returned no candidates.
    #[error("no {kind} found matching '{query}'")]
    NoMatch {
        /// Entity type that was searched for
        kind: String,
        /// The search text
        query: String,
    },

    /// The async agent reported an error event.
    #[error("async agent error: {0}")]
    Agent(String),

    /// The event stream closed before a terminal event.
    #[error("stream ended without completion (received {progress_events} progress events)")]
    StreamIncomplete {
        /// Number of progress events observed before the stream closed
        progress_events: u32,
    },

    /// The async agent did not finish within the configured limit.
    #[error("async agent timeout: request exceeded {} seconds", .limit.as_secs())]
    Timeout {
        /// The configured limit
        limit: std::time::Duration,
    },
}

impl ApiError {
    /// HTTP status code for backend errors, `None` for everything else.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Outcome of a single backend call.
pub type ApiResult = std::result::Result<JsonValue, ApiError>;
