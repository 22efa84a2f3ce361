//! MCP server for the JoeAPI construction management API.
//!
//! Run with `joeapi-mcp` for stdio, or `joeapi-mcp --transport http` to serve `POST /mcp`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use joeapi_mcp::{Config, McpServer, McpSession};

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    Stdio,
    /// JSON-RPC over `POST /mcp`
    Http,
}

/// MCP server for the JoeAPI construction management API.
///
/// Exposes JoeAPI operations as MCP tools for AI agents.
/// Every option can also be set through the listed environment variable.
#[derive(Parser)]
#[command(name = "joeapi-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// JoeAPI base URL (the /api/v1 prefix is added per request).
    #[arg(long, env = "JOEAPI_BASE_URL", default_value = joeapi_mcp::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Bearer token forwarded to JoeAPI.
    #[arg(long, env = "JOEAPI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Timeout for each JoeAPI request, in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT", value_name = "SECS", default_value_t = 30)]
    request_timeout: u64,

    /// Async-agent streaming endpoint.
    #[arg(long, env = "ASYNC_AGENT_URL", default_value = joeapi_mcp::config::DEFAULT_AGENT_URL)]
    agent_url: String,

    /// Overall limit for one async-agent run, in seconds.
    #[arg(long, env = "ASYNC_AGENT_TIMEOUT", value_name = "SECS", default_value_t = 360)]
    agent_timeout: u64,

    /// Transport to serve.
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1:8000")]
    listen: SocketAddr,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> joeapi_mcp::Result<Config> {
        Ok(Config::new(&self.base_url)?
            .with_api_key(self.api_key.clone())
            .with_request_timeout(Duration::from_secs(self.request_timeout))
            .with_agent_url(&self.agent_url)?
            .with_agent_timeout(Duration::from_secs(self.agent_timeout)))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the protocol.
    let level = if args.verbose { "joeapi_mcp=debug" } else { "joeapi_mcp=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let session = match McpSession::new(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: Failed to create session: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(base_url = %config.base_url, api_key = config.api_key.is_some(), "joeapi-mcp starting");

    let server = McpServer::new(session);
    let result = match args.transport {
        Transport::Stdio => server.run().await,
        Transport::Http => Arc::new(server).serve_http(args.listen).await,
    };

    if let Err(e) = result {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
