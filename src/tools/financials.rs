//! Financial tools.
//!
//! Tools: get_financials, get_transactions

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::aggregate::{fan_out, Section};
use crate::client::ApiRequest;
use crate::convert::{document_to_output, non_blank, parse_args, result_to_output};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{ToolDef, ToolOutput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRef {
    project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Transactions {
    project_id: String,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

/// Get all financial tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "get_financials",
            "Get a project's job balances and cost variance in one call. \
             Each part carries its own error if that lookup fails.",
            schema!(object {
                required: { "projectId": string }
            }),
        ),
        ToolDef::new(
            "get_transactions",
            "List a project's transactions, optionally limited to an ISO-8601 date range \
             (e.g. 2024-01-01 to 2024-12-31).",
            schema!(object {
                required: { "projectId": string },
                optional: { "startDate": string, "endDate": string }
            }),
        ),
    ]
}

/// Dispatch a financial tool call.
pub async fn dispatch(session: &McpSession, name: &str, args: Map<String, JsonValue>) -> Result<ToolOutput> {
    match name {
        "get_financials" => {
            let p: ProjectRef = parse_args(args)?;
            let by_project = |path: &str| ApiRequest::get(path).query("projectId", p.project_id.as_str());
            let sections = vec![
                Section::new("jobBalances", by_project("/job-balances")),
                Section::new("costVariance", by_project("/cost-variance")),
            ];
            Ok(document_to_output(fan_out(session.api(), sections).await))
        }

        "get_transactions" => {
            let t: Transactions = parse_args(args)?;
            let request = ApiRequest::get("/transactions")
                .query("projectId", t.project_id)
                .query("startDate", non_blank(t.start_date))
                .query("endDate", non_blank(t.end_date));
            Ok(result_to_output(session.api().request(request).await))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
