//! MCP server implementation.
//!
//! Handles JSON-RPC 2.0 over stdio (newline-delimited) or over HTTP (`POST /mcp`)
//! as defined by the Model Context Protocol.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::error::{rpc_codes, McpError, Result};
use crate::notify::ProgressSink;
use crate::session::McpSession;
use crate::tools::ToolRegistry;

/// MCP protocol version we support.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server information.
const SERVER_NAME: &str = "joeapi-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0"
    pub jsonrpc: String,
    /// Absent for notifications
    pub id: Option<JsonValue>,
    /// Method name, e.g. "tools/call"
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<JsonValue>,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0"
    pub jsonrpc: String,
    /// Id of the request being answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonValue>,
    /// Set on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Set on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// One of the `rpc_codes` constants
    pub code: i32,
    /// Human-readable description
    pub message: String,
    /// Extra detail, unused by this server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<JsonValue>, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<JsonValue>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    /// Create an error response from an McpError.
    pub fn from_error(id: Option<JsonValue>, err: McpError) -> Self {
        Self::error(id, err.rpc_code(), err.to_string())
    }
}

/// MCP server.
pub struct McpServer {
    session: McpSession,
    registry: ToolRegistry,
}

impl McpServer {
    /// Create a new MCP server with the given session.
    pub fn new(session: McpSession) -> Self {
        Self {
            session,
            registry: ToolRegistry::new(),
        }
    }

    /// Run the server, reading from stdin and writing to stdout.
    pub async fn run(&self) -> Result<()> {
        self.serve_lines(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC from `input` until EOF.
    ///
    /// Requests run concurrently, so a long tool call does not hold up later
    /// messages. Each response is written when its request finishes, after any
    /// progress notifications raised so far. Returns once input is exhausted
    /// and every request in flight has been answered.
    pub async fn serve_lines<R, W>(&self, input: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonValue>();
        let mut lines = input.lines();
        let mut in_flight: FuturesUnordered<LocalBoxFuture<'_, Option<JsonRpcResponse>>> = FuturesUnordered::new();
        let mut reading = true;

        while reading || !in_flight.is_empty() {
            tokio::select! {
                line = lines.next_line(), if reading => match line? {
                    Some(line) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                            Ok(request) => in_flight.push(self.handle_request(request, Some(tx.clone())).boxed_local()),
                            Err(e) => {
                                let response =
                                    JsonRpcResponse::error(None, rpc_codes::PARSE_ERROR, format!("Parse error: {}", e));
                                write_message(&mut out, &response).await?;
                            }
                        }
                    }
                    None => {
                        // EOF - client disconnected
                        debug!(in_flight = in_flight.len(), "stdin closed");
                        reading = false;
                    }
                },
                Some(response) = in_flight.next(), if !in_flight.is_empty() => {
                    while let Ok(note) = rx.try_recv() {
                        write_message(&mut out, &note).await?;
                    }
                    if let Some(response) = response {
                        write_message(&mut out, &response).await?;
                    }
                }
                Some(note) = rx.recv() => write_message(&mut out, &note).await?,
            }
        }

        Ok(())
    }

    /// Serve MCP over HTTP until the process is stopped.
    pub async fn serve_http(self: Arc<Self>, addr: SocketAddr) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "listening for MCP over HTTP");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// HTTP routes: `POST /mcp` takes one JSON-RPC message.
    pub fn router(self: Arc<Self>) -> Router {
        Router::new().route("/mcp", post(http_message)).with_state(self)
    }

    /// Handle a single JSON-RPC message. Notifications get no response.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        notifier: Option<UnboundedSender<JsonValue>>,
    ) -> Option<JsonRpcResponse> {
        // Validate JSON-RPC version
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                rpc_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version".to_string(),
            ));
        }

        if request.id.is_none() {
            debug!(method = %request.method, "notification received");
            return None;
        }

        // Route to appropriate handler
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request, notifier).await,
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            _ => JsonRpcResponse::error(
                request.id,
                rpc_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle the initialize request.
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    /// Handle the tools/list request.
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools: Vec<JsonValue> = self
            .registry
            .tools()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect();

        JsonRpcResponse::success(request.id, serde_json::json!({ "tools": tools }))
    }

    /// Handle the tools/call request.
    async fn handle_tools_call(
        &self,
        request: JsonRpcRequest,
        notifier: Option<UnboundedSender<JsonValue>>,
    ) -> JsonRpcResponse {
        // Extract name and arguments from params
        let params = match &request.params {
            Some(JsonValue::Object(obj)) => obj,
            _ => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing params object".to_string(),
                )
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing 'name' in params".to_string(),
                )
            }
        };

        let arguments = match params.get("arguments") {
            Some(JsonValue::Object(obj)) => obj.clone(),
            Some(JsonValue::Null) | None => Map::new(),
            _ => {
                return JsonRpcResponse::error(
                    request.id,
                    rpc_codes::INVALID_PARAMS,
                    "'arguments' must be an object".to_string(),
                )
            }
        };

        let progress = params
            .get("_meta")
            .and_then(|m| m.get("progressToken"))
            .cloned()
            .zip(notifier)
            .map(|(token, tx)| ProgressSink::new(token, tx));

        // Dispatch the tool call
        debug!(tool = %name, "tools/call");
        match self
            .registry
            .dispatch(&self.session, &name, arguments, progress.as_ref())
            .await
        {
            Ok(output) => JsonRpcResponse::success(request.id, output.to_json()),
            Err(err) => JsonRpcResponse::from_error(request.id, err),
        }
    }
}

async fn write_message<W, T>(out: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(message)?;
    out.write_all(json.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

async fn http_message(State(server): State<Arc<McpServer>>, body: Bytes) -> Response {
    let request = match serde_json::from_slice::<JsonRpcRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            let response = JsonRpcResponse::error(None, rpc_codes::PARSE_ERROR, format!("Parse error: {}", e));
            return (StatusCode::BAD_REQUEST, axum::Json(response)).into_response();
        }
    };

    match server.handle_request(request, None).await {
        Some(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
