//! Async-agent streaming relay.
//!
//! Posts a prompt to the async-agent webhook and consumes its Server-Sent-Events
//! response until a terminal event arrives. Progress events are logged and
//! forwarded; only the `complete` payload is returned to the caller.

use std::fmt::Display;
use std::pin::pin;
use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, ApiResult, McpError, Result};
use crate::notify::ProgressSink;

/// Split buffered SSE bytes into complete frames.
///
/// `chunk` is appended to `buffer`, carriage returns are dropped, and every
/// segment terminated by a blank line is returned as a frame. The trailing
/// partial segment is handed back as the new buffer.
pub fn split_frames(mut buffer: Vec<u8>, chunk: &[u8]) -> (Vec<String>, Vec<u8>) {
    // The retained buffer holds no delimiter, so only its last byte can pair
    // with the new chunk.
    let mut scan = buffer.len().saturating_sub(1);
    buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

    let mut frames = Vec::new();
    let mut start = 0;
    while let Some(pos) = buffer[scan..].windows(2).position(|w| w == b"\n\n") {
        let end = scan + pos;
        frames.push(String::from_utf8_lossy(&buffer[start..end]).into_owned());
        start = end + 2;
        scan = start;
    }
    buffer.drain(..start);

    (frames, buffer)
}

/// An event emitted by the async agent.
///
/// Payload fields are kept as raw JSON; the agent does not always send them
/// with the documented types.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SseEvent {
    /// Intermediate status update.
    Progress {
        /// Human-readable status line
        #[serde(default)]
        message: Option<JsonValue>,
        /// Completion percentage, usually a number
        #[serde(default, rename = "progress")]
        percent: Option<JsonValue>,
    },
    /// Final result of the run.
    Complete {
        /// The agent's answer
        #[serde(default)]
        data: JsonValue,
    },
    /// The run failed.
    Error {
        /// Failure description, any JSON shape
        #[serde(default)]
        message: Option<JsonValue>,
    },
    /// Any other event type.
    #[serde(other)]
    Other,
}

/// Render a payload field as text. Strings are taken as-is, `null` is absent.
fn field_text(value: Option<JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Read a percentage from a number or numeric string, falling back to 0.
fn field_percent(value: Option<&JsonValue>) -> f64 {
    match value {
        Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(JsonValue::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Decode one frame. Returns `None` for keep-alives, comments and frames whose
/// payload is not valid JSON.
pub fn parse_event(frame: &str) -> Option<SseEvent> {
    let data: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|d| d.strip_prefix(' ').unwrap_or(d))
        .collect();
    if data.is_empty() {
        return None;
    }

    let payload = data.join("\n");
    match serde_json::from_str(&payload) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, payload = %payload, "skipping unparseable event");
            None
        }
    }
}

/// Wall-clock limit shared by connection setup and stream consumption.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    limit: Duration,
}

impl Deadline {
    /// A deadline `limit` from now.
    pub fn after(limit: Duration) -> Self {
        Self {
            at: Instant::now() + limit,
            limit,
        }
    }

    fn expired(&self) -> ApiError {
        ApiError::Timeout { limit: self.limit }
    }
}

#[derive(Debug, Default)]
struct RelayState {
    progress_events: u32,
    result: Option<JsonValue>,
}

impl RelayState {
    fn apply(&mut self, event: SseEvent, progress: Option<&ProgressSink>) -> std::result::Result<(), ApiError> {
        match event {
            SseEvent::Progress { message, percent } => {
                self.progress_events += 1;
                let percent = field_percent(percent.as_ref());
                let message = field_text(message).unwrap_or_default();
                info!(count = self.progress_events, percent, message = %message, "async agent progress");
                if let Some(sink) = progress {
                    sink.report(percent, &message);
                }
            }
            SseEvent::Complete { data } => {
                info!(progress_events = self.progress_events, "async agent completed");
                self.result = Some(data);
                if let Some(sink) = progress {
                    sink.report(100.0, "Workflow completed successfully");
                }
            }
            SseEvent::Error { message } => {
                let message = field_text(message).unwrap_or_else(|| "unknown error".to_string());
                warn!(message = %message, "async agent reported an error");
                return Err(ApiError::Agent(message));
            }
            SseEvent::Other => debug!("ignoring async agent event of unknown type"),
        }
        Ok(())
    }

    fn finish(&mut self) -> ApiResult {
        self.result.take().ok_or(ApiError::StreamIncomplete {
            progress_events: self.progress_events,
        })
    }
}

async fn consume<S, B, E>(stream: S, state: &mut RelayState, progress: Option<&ProgressSink>) -> ApiResult
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = pin!(stream);
    let mut buffer = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::Transport(format!("stream read error: {}", e)))?;
        let (frames, rest) = split_frames(buffer, chunk.as_ref());
        buffer = rest;
        for frame in frames {
            if let Some(event) = parse_event(&frame) {
                state.apply(event, progress)?;
            }
        }
    }

    // The backend may close without a final blank line.
    if !buffer.is_empty() {
        if let Some(event) = parse_event(&String::from_utf8_lossy(&buffer)) {
            state.apply(event, progress)?;
        }
    }

    state.finish()
}

/// Consume an SSE byte stream until it ends, fails, or `deadline` passes.
///
/// The stream is owned by this call and dropped on every exit path.
pub async fn relay_stream<S, B, E>(stream: S, deadline: &Deadline, progress: Option<&ProgressSink>) -> ApiResult
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut state = RelayState::default();
    let outcome = tokio::time::timeout_at(deadline.at, consume(stream, &mut state, progress)).await;
    match outcome {
        Ok(result) => result,
        Err(_) => {
            warn!(
                progress_events = state.progress_events,
                limit_secs = deadline.limit.as_secs(),
                "async agent timed out, stream cancelled"
            );
            Err(deadline.expired())
        }
    }
}

/// Client for the async-agent webhook.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    url: Url,
    timeout: Duration,
}

impl AgentClient {
    /// Create a client from the runtime configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| McpError::Config(format!("failed to build streaming HTTP client: {}", e)))?;

        Ok(Self {
            http,
            url: config.agent_url.clone(),
            timeout: config.agent_timeout,
        })
    }

    /// Run `prompt` through the agent and return its final result.
    pub async fn run(&self, prompt: &str, progress: Option<&ProgressSink>) -> ApiResult {
        let deadline = Deadline::after(self.timeout);
        let payload = serde_json::json!({
            "prompt": prompt,
            "searchWorkflow": true,
            "async": false
        });
        info!(url = %self.url, "starting async agent run");

        let send = self
            .http
            .post(self.url.clone())
            .header(ACCEPT, "text/event-stream")
            .json(&payload)
            .send();
        let response = match tokio::time::timeout_at(deadline.at, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => return Err(deadline.expired()),
            Ok(Err(e)) => return Err(ApiError::Transport(e.to_string())),
            Err(_) => return Err(deadline.expired()),
        };

        let status = response.status();
        debug!(status = status.as_u16(), "async agent responded");
        if !status.is_success() {
            let text = read_body(response, &deadline).await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or_else(|_| JsonValue::String(text.clone()));
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: text,
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("")
            .to_string();
        if content_type.starts_with("application/json") {
            let text = read_body(response, &deadline).await?;
            return serde_json::from_str(&text).map_err(|e| ApiError::Parse(e.to_string()));
        }

        relay_stream(response.bytes_stream(), &deadline, progress).await
    }
}

async fn read_body(response: reqwest::Response, deadline: &Deadline) -> std::result::Result<String, ApiError> {
    match tokio::time::timeout_at(deadline.at, response.text()).await {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ApiError::Transport(format!("reading response body: {}", e))),
        Err(_) => Err(deadline.expired()),
    }
}
