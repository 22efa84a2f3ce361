//! Project and schedule tools.
//!
//! Tools: find_project, get_project_details, list_schedules, get_schedule_revisions,
//!        get_estimate_revisions, assign_supervisor

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::aggregate::{fan_out, Section};
use crate::client::ApiRequest;
use crate::convert::{
    document_to_output, non_blank, parse_args, result_to_output, PageArgs, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{ToolDef, ToolOutput};

#[derive(Debug, Deserialize)]
struct Query {
    query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRef {
    project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListSchedules {
    #[serde(flatten)]
    page: PageArgs,
    #[serde(default)]
    project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignSupervisor {
    project_id: String,
    supervisor_id: String,
}

/// Get all project tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "find_project",
            "Search for projects by name, address or description.",
            schema!(object {
                required: { "query": string }
            }),
        ),
        ToolDef::new(
            "get_project_details",
            "Get comprehensive project details including metadata and current status.",
            schema!(object {
                required: { "projectId": string }
            }),
        ),
        ToolDef::new(
            "list_schedules",
            "Retrieve project schedules. With projectId, returns that project's schedules \
             and tasks together; a failure in one part is reported in place.",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "page": { "type": "integer", "minimum": 1, "default": DEFAULT_PAGE },
                    "limit": { "type": "integer", "minimum": 1, "maximum": MAX_LIMIT, "default": DEFAULT_LIMIT },
                    "projectId": { "type": "string", "description": "Project GUID" }
                },
                "required": []
            }),
        ),
        ToolDef::new(
            "get_schedule_revisions",
            "Get the revision history of a project's schedule.",
            schema!(object {
                required: { "projectId": string }
            }),
        ),
        ToolDef::new(
            "get_estimate_revisions",
            "Get the revision history of a project's estimates.",
            schema!(object {
                required: { "projectId": string }
            }),
        ),
        ToolDef::new(
            "assign_supervisor",
            "Assign a supervisor to a project. Returns the updated assignment.",
            schema!(object {
                required: { "projectId": string, "supervisorId": string }
            }),
        ),
    ]
}

/// Dispatch a project tool call.
pub async fn dispatch(session: &McpSession, name: &str, args: Map<String, JsonValue>) -> Result<ToolOutput> {
    let request = match name {
        "find_project" => {
            let q: Query = parse_args(args)?;
            ApiRequest::get("/search").query("q", q.query).query("type", "project")
        }

        "get_project_details" => {
            let p: ProjectRef = parse_args(args)?;
            ApiRequest::get("/project-details").query("projectId", p.project_id)
        }

        "list_schedules" => {
            let list: ListSchedules = parse_args(args)?;
            match non_blank(list.project_id) {
                Some(project_id) => {
                    let sections = vec![
                        Section::new(
                            "schedules",
                            ApiRequest::get("/project-schedules").query("projectId", project_id.as_str()),
                        ),
                        Section::new(
                            "tasks",
                            ApiRequest::get("/project-schedule-tasks").query("projectId", project_id.as_str()),
                        ),
                    ];
                    return Ok(document_to_output(fan_out(session.api(), sections).await));
                }
                None => ApiRequest::get("/project-schedules")
                    .query("page", list.page.page())
                    .query("limit", list.page.limit()),
            }
        }

        "get_schedule_revisions" => {
            let p: ProjectRef = parse_args(args)?;
            ApiRequest::get("/schedule-revisions").query("projectId", p.project_id)
        }

        "get_estimate_revisions" => {
            let p: ProjectRef = parse_args(args)?;
            ApiRequest::get("/estimate-revisions").query("projectId", p.project_id)
        }

        "assign_supervisor" => {
            let a: AssignSupervisor = parse_args(args)?;
            ApiRequest::put("/projects", serde_json::json!({ "SupervisorId": a.supervisor_id }))
                .segment(a.project_id)
                .segment("supervisor")
        }

        _ => return Err(McpError::UnknownTool(name.to_string())),
    };

    Ok(result_to_output(session.api().request(request).await))
}
