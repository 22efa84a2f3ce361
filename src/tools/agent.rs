//! Async-agent delegation tool.
//!
//! Tools: async_agent

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::convert::{parse_args, result_to_output};
use crate::error::{McpError, Result};
use crate::notify::ProgressSink;
use crate::schema;
use crate::session::McpSession;
use crate::tools::{ToolDef, ToolOutput};

#[derive(Debug, Deserialize)]
struct Prompt {
    prompt: String,
}

/// Get all agent tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "async_agent",
        "Delegate a multi-step workflow to the async agent and wait for its result. \
         Use for tasks that need several coordinated lookups or long-running orchestration. \
         Progress is reported while the agent works.",
        schema!(object {
            required: { "prompt": string }
        }),
    )]
}

/// Dispatch an agent tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
    progress: Option<&ProgressSink>,
) -> Result<ToolOutput> {
    match name {
        "async_agent" => {
            let p: Prompt = parse_args(args)?;
            if p.prompt.trim().is_empty() {
                return Err(McpError::InvalidArgs("prompt must not be empty".to_string()));
            }
            Ok(result_to_output(session.agent().run(&p.prompt, progress).await))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
