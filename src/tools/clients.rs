//! Client and contact tools.
//!
//! Tools: list_clients, create_client, list_contacts, create_contact

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::client::ApiRequest;
use crate::convert::{parse_args, result_to_output, PageArgs};
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{ToolDef, ToolOutput};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NewClient {
    name: String,
    email_address: String,
    company_name: String,
    phone: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NewContact {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    client_id: String,
}

/// Get all client tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_clients",
            "Retrieve a paginated list of clients with their details. \
             Defaults to page 1 with 5 items per page (at most 10).",
            schema!(object {
                optional: { "page": page, "limit": limit }
            }),
        ),
        ToolDef::new(
            "create_client",
            "Create a new client record. Returns the created client.",
            schema!(object {
                required: {
                    "Name": string,
                    "EmailAddress": string,
                    "CompanyName": string,
                    "Phone": string
                }
            }),
        ),
        ToolDef::new(
            "list_contacts",
            "Retrieve a list of contacts. Defaults to 5 items (at most 10).",
            schema!(object {
                optional: { "limit": limit }
            }),
        ),
        ToolDef::new(
            "create_contact",
            "Create a new contact linked to a client. ClientId is the client's GUID.",
            schema!(object {
                required: {
                    "FirstName": string,
                    "LastName": string,
                    "Email": string,
                    "Phone": string,
                    "ClientId": string
                }
            }),
        ),
    ]
}

/// Dispatch a client tool call.
pub async fn dispatch(session: &McpSession, name: &str, args: Map<String, JsonValue>) -> Result<ToolOutput> {
    let request = match name {
        "list_clients" => {
            let page: PageArgs = parse_args(args)?;
            ApiRequest::get("/clients")
                .query("page", page.page())
                .query("limit", page.limit())
        }

        "create_client" => {
            let client: NewClient = parse_args(args)?;
            ApiRequest::post("/clients", serde_json::to_value(client)?)
        }

        "list_contacts" => {
            let page: PageArgs = parse_args(args)?;
            ApiRequest::get("/contacts").query("limit", page.limit())
        }

        "create_contact" => {
            let contact: NewContact = parse_args(args)?;
            ApiRequest::post("/contacts", serde_json::to_value(contact)?)
        }

        _ => return Err(McpError::UnknownTool(name.to_string())),
    };

    Ok(result_to_output(session.api().request(request).await))
}
