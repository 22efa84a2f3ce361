//! JoeAPI REST client.
//!
//! One call in, one `ApiResult` out. Every failure path (non-2xx status,
//! transport error, non-JSON body) is converted into an `ApiError`.

use reqwest::header::CONTENT_TYPE;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, ApiResult, McpError, Result};

/// Version prefix prepended to every request path.
pub const API_PREFIX: [&str; 2] = ["api", "v1"];

/// HTTP methods used against JoeAPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Whether requests with this method send a JSON body.
    pub fn carries_body(self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single request against JoeAPI, relative to the versioned prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path segments after `/api/v1`, unencoded
    pub segments: Vec<String>,
    /// Query parameters in insertion order; `null` values are not sent
    pub query: Vec<(String, JsonValue)>,
    /// Ignored unless the method carries a body
    pub body: Option<JsonValue>,
}

impl ApiRequest {
    /// Create a request for `path` (e.g. `/project-details`).
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// GET `path`.
    pub fn get(path: &str) -> Self {
        Self::new(Method::Get, path)
    }

    /// POST `body` to `path`.
    pub fn post(path: &str, body: JsonValue) -> Self {
        Self::new(Method::Post, path).body(body)
    }

    /// PUT `body` to `path`.
    pub fn put(path: &str, body: JsonValue) -> Self {
        Self::new(Method::Put, path).body(body)
    }

    /// DELETE `path`.
    pub fn delete(path: &str) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append one path segment. The value is percent-encoded as a whole,
    /// so identifiers containing `/` stay a single segment.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Add a query parameter. `null` values are dropped when the URL is built.
    pub fn query(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

/// Build the full URL for `request` against `base`.
pub fn build_url(base: &Url, request: &ApiRequest) -> std::result::Result<Url, ApiError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("base URL '{}' cannot carry a path", base)))?;
        path.pop_if_empty();
        path.extend(API_PREFIX);
        path.extend(&request.segments);
    }

    let pairs: Vec<(&str, String)> = request
        .query
        .iter()
        .filter_map(|(k, v)| query_value(v).map(|v| (k.as_str(), v)))
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }

    Ok(url)
}

fn query_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// HTTP client for the JoeAPI backend.
#[derive(Debug, Clone)]
pub struct JoeApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl JoeApiClient {
    /// Create a client from the runtime configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| McpError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Perform one request.
    pub async fn request(&self, request: ApiRequest) -> ApiResult {
        let url = build_url(&self.base_url, &request)?;
        debug!(method = ?request.method, %url, "joeapi request");

        let mut builder = self
            .http
            .request(request.method.as_reqwest(), url.clone())
            .header(CONTENT_TYPE, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if request.method.carries_body() {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "joeapi returned an error status");
            // The status is authoritative even if the body cannot be read.
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!(error = %e, "error response body unreadable");
                    status.canonical_reason().unwrap_or_default().to_string()
                }
            };
            let body = serde_json::from_str(&text).unwrap_or_else(|_| JsonValue::String(text.clone()));
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: text,
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("reading response body: {}", e)))?;
        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn base() -> Url {
        Url::parse("https://joeapi.example.com").unwrap()
    }

    fn query_map(url: &Url) -> BTreeMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_prefix_is_always_added() {
        let url = build_url(&base(), &ApiRequest::get("/clients")).unwrap();
        assert_eq!(url.as_str(), "https://joeapi.example.com/api/v1/clients");

        let url = build_url(&base(), &ApiRequest::get("project-details")).unwrap();
        assert_eq!(url.path(), "/api/v1/project-details");
    }

    #[test]
    fn test_base_path_is_kept() {
        let base = Url::parse("https://example.com/joe/").unwrap();
        let url = build_url(&base, &ApiRequest::get("/clients")).unwrap();
        assert_eq!(url.path(), "/joe/api/v1/clients");
    }

    #[test]
    fn test_null_query_values_are_dropped() {
        let request = ApiRequest::get("/search")
            .query("q", "roof")
            .query("type", JsonValue::Null)
            .query("projectId", None::<String>)
            .query("page", 2)
            .query("archived", false);
        let url = build_url(&base(), &request).unwrap();

        let pairs = query_map(&url);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs["q"], "roof");
        assert_eq!(pairs["page"], "2");
        assert_eq!(pairs["archived"], "false");
        assert!(!url.as_str().contains("type"));
        assert!(!url.as_str().contains("projectId"));
    }

    #[test]
    fn test_no_query_string_when_all_values_null() {
        let request = ApiRequest::get("/transactions").query("startDate", JsonValue::Null);
        let url = build_url(&base(), &request).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_query_values_are_encoded() {
        let request = ApiRequest::get("/search").query("q", "smith & sons");
        let url = build_url(&base(), &request).unwrap();
        assert_eq!(query_map(&url)["q"], "smith & sons");
    }

    #[test]
    fn test_segments_are_encoded() {
        let request = ApiRequest::delete("/comments").segment("a/b c");
        let url = build_url(&base(), &request).unwrap();
        assert_eq!(url.path(), "/api/v1/comments/a%2Fb%20c");
    }

    #[test]
    fn test_only_body_methods_carry_body() {
        assert!(Method::Post.carries_body());
        assert!(Method::Put.carries_body());
        assert!(Method::Patch.carries_body());
        assert!(!Method::Get.carries_body());
        assert!(!Method::Delete.carries_body());

        let request = ApiRequest::post("/clients", json!({"Name": "Joe"}));
        assert_eq!(request.body, Some(json!({"Name": "Joe"})));
    }
}
