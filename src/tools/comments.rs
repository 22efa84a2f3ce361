//! Action item and comment tools.
//!
//! Tools: find_action_items, list_comments, add_comment, delete_comment

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::client::ApiRequest;
use crate::convert::{non_blank, parse_args, result_to_output, PageArgs};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{ToolDef, ToolOutput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindActionItems {
    query: String,
    #[serde(default)]
    project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListComments {
    project_id: String,
    #[serde(flatten)]
    page: PageArgs,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewComment {
    project_id: String,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentRef {
    comment_id: String,
}

/// Get all action item and comment tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "find_action_items",
            "Search action items by title or description, optionally within one project.",
            schema!(object {
                required: { "query": string },
                optional: { "projectId": string }
            }),
        ),
        ToolDef::new(
            "list_comments",
            "List comments on a project, newest first.",
            schema!(object {
                required: { "projectId": string },
                optional: { "page": page, "limit": limit }
            }),
        ),
        ToolDef::new(
            "add_comment",
            "Add a comment to a project. Returns the created comment.",
            schema!(object {
                required: { "projectId": string, "text": string }
            }),
        ),
        ToolDef::new(
            "delete_comment",
            "Delete a comment by its id.",
            schema!(object {
                required: { "commentId": string }
            }),
        ),
    ]
}

/// Dispatch an action item or comment tool call.
pub async fn dispatch(session: &McpSession, name: &str, args: Map<String, JsonValue>) -> Result<ToolOutput> {
    let request = match name {
        "find_action_items" => {
            let find: FindActionItems = parse_args(args)?;
            ApiRequest::get("/search")
                .query("q", find.query)
                .query("type", "action-item")
                .query("projectId", non_blank(find.project_id))
        }

        "list_comments" => {
            let list: ListComments = parse_args(args)?;
            ApiRequest::get("/comments")
                .query("projectId", list.project_id)
                .query("page", list.page.page())
                .query("limit", list.page.limit())
        }

        "add_comment" => {
            let comment: NewComment = parse_args(args)?;
            ApiRequest::post(
                "/comments",
                serde_json::json!({
                    "ProjectId": comment.project_id,
                    "Comment": comment.text
                }),
            )
        }

        "delete_comment" => {
            let c: CommentRef = parse_args(args)?;
            ApiRequest::delete("/comments").segment(c.comment_id)
        }

        _ => return Err(McpError::UnknownTool(name.to_string())),
    };

    Ok(result_to_output(session.api().request(request).await))
}
