//! Fan-out aggregation over JoeAPI.
//!
//! A fixed list of requests is issued in parallel and every outcome lands in its
//! own section of one JSON document. A failed branch only affects its section.

use futures::future::join_all;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

use crate::client::{ApiRequest, JoeApiClient};
use crate::error::{ApiError, ApiResult};

/// Fields that may carry a project identifier in search results.
const PROJECT_ID_FIELDS: &[&str] = &["ProjectID", "ProjectId", "projectId", "Id", "id"];

/// Fields that may wrap the list of search results.
const RESULT_LIST_FIELDS: &[&str] = &["results", "data", "projects", "items"];

/// One branch of a fan-out.
#[derive(Debug, Clone)]
pub struct Section {
    /// Where the outcome is placed; dots nest (`financials.estimates`)
    pub key: &'static str,
    /// The request whose outcome fills the section
    pub request: ApiRequest,
}

impl Section {
    /// A section filled by `request`.
    pub fn new(key: &'static str, request: ApiRequest) -> Self {
        Self { key, request }
    }
}

/// Issue every section's request concurrently and collect the outcomes.
///
/// All branches are awaited; none short-circuits the others.
pub async fn fan_out(api: &JoeApiClient, sections: Vec<Section>) -> Map<String, JsonValue> {
    let (keys, requests): (Vec<_>, Vec<_>) = sections.into_iter().map(|s| (s.key, s.request)).unzip();
    debug!(branches = keys.len(), "fan-out started");

    let outcomes = join_all(requests.into_iter().map(|r| api.request(r))).await;

    let mut doc = Map::new();
    for (key, outcome) in keys.into_iter().zip(outcomes) {
        insert_section(&mut doc, key, section_value(key, outcome));
    }
    doc
}

fn section_value(key: &str, outcome: ApiResult) -> JsonValue {
    match outcome {
        Ok(body) => body,
        Err(err) => {
            warn!(section = key, error = %err, "fan-out branch failed");
            serde_json::json!({ "error": err.to_string() })
        }
    }
}

/// Place `value` at a dotted `key`, creating intermediate objects.
pub fn insert_section(doc: &mut Map<String, JsonValue>, key: &str, value: JsonValue) {
    match key.split_once('.') {
        None => {
            doc.insert(key.to_string(), value);
        }
        Some((head, rest)) => {
            let child = doc
                .entry(head.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !child.is_object() {
                *child = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(child) = child {
                insert_section(child, rest, value);
            }
        }
    }
}

/// Resolve a free-text query to a single project id with one search call.
pub async fn resolve_project(api: &JoeApiClient, query: &str) -> Result<String, ApiError> {
    let request = ApiRequest::get("/search").query("q", query).query("type", "project");
    let body = api.request(request).await?;

    let candidates = candidate_ids(&body, PROJECT_ID_FIELDS);
    debug!(query, candidates = candidates.len(), "project search resolved");
    candidates.into_iter().next().ok_or_else(|| ApiError::NoMatch {
        kind: "projects".to_string(),
        query: query.to_string(),
    })
}

/// Extract identifiers from a search response, in result order.
pub fn candidate_ids(body: &JsonValue, id_fields: &[&str]) -> Vec<String> {
    let list = match body {
        JsonValue::Array(items) => Some(items),
        JsonValue::Object(obj) => RESULT_LIST_FIELDS
            .iter()
            .find_map(|f| obj.get(*f).and_then(|v| v.as_array())),
        _ => None,
    };

    list.map(|items| {
        items
            .iter()
            .filter_map(|item| {
                id_fields.iter().find_map(|f| match item.get(*f)? {
                    JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
                    JsonValue::Number(n) => Some(n.to_string()),
                    _ => None,
                })
            })
            .collect()
    })
    .unwrap_or_default()
}

/// Sections fetched for one project by `discover_project`.
pub fn project_sections(project_id: &str) -> Vec<Section> {
    let by_project = |path: &str| ApiRequest::get(path).query("projectId", project_id);
    vec![
        Section::new("project", by_project("/project-details")),
        Section::new("financials.jobBalances", by_project("/job-balances")),
        Section::new("financials.costVariance", by_project("/cost-variance")),
        Section::new("financials.estimates", by_project("/estimates")),
        Section::new("schedules.schedules", by_project("/project-schedules")),
        Section::new("schedules.tasks", by_project("/project-schedule-tasks")),
        Section::new("actionItems", by_project("/action-items")),
    ]
}
