//! # joeapi-mcp
//!
//! MCP (Model Context Protocol) server for the JoeAPI construction management API.
//!
//! This crate exposes JoeAPI's REST endpoints as tools for AI agents. Each tool maps
//! to one HTTP request, to a fixed set of parallel requests merged into one document,
//! or to a streamed run of the JoeAPI async agent.
//!
//! ## Features
//!
//! - **22 tools** covering clients, contacts, proposals, projects, schedules,
//!   financials, comments, search and agent delegation
//! - **Project discovery**: one call fans out to seven endpoints; a failing branch
//!   is reported in its own section without failing the call
//! - **Async agent relay**: consumes the agent's Server-Sent-Events stream with an
//!   overall deadline and forwards progress to the client
//! - **Two transports**: JSON-RPC 2.0 over stdin/stdout, or over HTTP (`POST /mcp`)
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "joeapi": {
//!       "command": "/path/to/joeapi-mcp",
//!       "env": { "JOEAPI_API_KEY": "..." }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use joeapi_mcp::{Config, McpServer, McpSession};
//!
//! # async fn run() -> joeapi_mcp::Result<()> {
//! let config = Config::new("https://joeapi.fly.dev")?;
//! let session = McpSession::new(&config)?;
//! let server = McpServer::new(session);
//!
//! // Reads from stdin, writes to stdout
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod client;
pub mod config;
mod convert;
mod error;
pub mod notify;
pub mod relay;
mod server;
mod session;
mod tools;

pub use client::{ApiRequest, JoeApiClient, Method};
pub use config::Config;
pub use convert::{PageArgs, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
pub use error::{ApiError, ApiResult, McpError, Result};
pub use relay::AgentClient;
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::McpSession;
pub use tools::{ToolDef, ToolOutput, ToolRegistry};
