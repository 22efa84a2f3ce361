//! Cross-entity search tools.
//!
//! Tools: search, discover_project

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::aggregate::{fan_out, project_sections, resolve_project};
use crate::client::ApiRequest;
use crate::convert::{document_to_output, non_blank, parse_args, result_to_output};
use crate::error::{McpError, Result};
use crate::session::McpSession;
use crate::tools::{ToolDef, ToolOutput};

/// Entity types understood by the search endpoint.
const SEARCH_TYPES: &[&str] = &[
    "project",
    "estimate",
    "schedule",
    "proposal",
    "estimateCategory",
    "constructionTask",
    "action-item",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Search {
    query: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Discover {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    query: Option<String>,
}

/// Get all search tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "search",
            "Search across entity types (projects, estimates, schedules, proposals, \
             estimate categories, construction tasks, action items). Narrow with type \
             and projectId.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string" },
                    "type": { "type": "string", "enum": SEARCH_TYPES },
                    "projectId": { "type": "string" }
                },
                "required": ["query"]
            }),
        ),
        ToolDef::new(
            "discover_project",
            "Gather everything about one project in a single call: details, job balances, \
             cost variance, estimates, schedules, tasks and action items. Pass projectId, \
             or a query to pick the best matching project. Sections that fail carry an \
             error in place of data.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "projectId": { "type": "string" },
                    "query": { "type": "string" }
                },
                "required": []
            }),
        ),
    ]
}

/// Dispatch a search tool call.
pub async fn dispatch(session: &McpSession, name: &str, args: Map<String, JsonValue>) -> Result<ToolOutput> {
    match name {
        "search" => {
            let s: Search = parse_args(args)?;
            let request = ApiRequest::get("/search")
                .query("q", s.query)
                .query("type", non_blank(s.kind))
                .query("projectId", non_blank(s.project_id));
            Ok(result_to_output(session.api().request(request).await))
        }

        "discover_project" => {
            let d: Discover = parse_args(args)?;
            let project_id = match (non_blank(d.project_id), non_blank(d.query)) {
                (Some(id), _) => id,
                (None, Some(query)) => match resolve_project(session.api(), &query).await {
                    Ok(id) => id,
                    Err(err) => return Ok(ToolOutput::error(err.to_string())),
                },
                (None, None) => return Err(McpError::MissingArg("projectId or query".to_string())),
            };

            info!(project_id = %project_id, "discovering project");
            let mut doc = fan_out(session.api(), project_sections(&project_id)).await;
            doc.insert("projectId".to_string(), JsonValue::String(project_id));
            Ok(document_to_output(doc))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
