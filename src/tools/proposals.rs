//! Proposal tools.
//!
//! Tools: list_proposals, create_proposal, find_proposal

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::client::ApiRequest;
use crate::convert::{non_blank, parse_args, result_to_output, PageArgs};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{ToolDef, ToolOutput};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NewProposal {
    title: String,
    description: String,
    client_id: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindProposal {
    query: String,
    #[serde(default)]
    project_id: Option<String>,
}

/// Get all proposal tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_proposals",
            "Retrieve a paginated list of proposals. Defaults to page 1 with 5 items per page.",
            schema!(object {
                optional: { "page": page, "limit": limit }
            }),
        ),
        ToolDef::new(
            "create_proposal",
            "Create a new proposal for a client. Amount is the proposal total.",
            schema!(object {
                required: {
                    "Title": string,
                    "Description": string,
                    "ClientId": string,
                    "Amount": number
                }
            }),
        ),
        ToolDef::new(
            "find_proposal",
            "Search proposals by number, title or description, optionally within one project.",
            schema!(object {
                required: { "query": string },
                optional: { "projectId": string }
            }),
        ),
    ]
}

/// Dispatch a proposal tool call.
pub async fn dispatch(session: &McpSession, name: &str, args: Map<String, JsonValue>) -> Result<ToolOutput> {
    let request = match name {
        "list_proposals" => {
            let page: PageArgs = parse_args(args)?;
            ApiRequest::get("/proposals")
                .query("page", page.page())
                .query("limit", page.limit())
        }

        "create_proposal" => {
            let proposal: NewProposal = parse_args(args)?;
            ApiRequest::post("/proposals", serde_json::to_value(proposal)?)
        }

        "find_proposal" => {
            let find: FindProposal = parse_args(args)?;
            ApiRequest::get("/search")
                .query("q", find.query)
                .query("type", "proposal")
                .query("projectId", non_blank(find.project_id))
        }

        _ => return Err(McpError::UnknownTool(name.to_string())),
    };

    Ok(result_to_output(session.api().request(request).await))
}
