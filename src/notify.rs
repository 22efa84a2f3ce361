//! Progress notifications sent to the MCP client while a tool is running.

use serde_json::Value as JsonValue;
use tokio::sync::mpsc::UnboundedSender;

/// Forwards progress for one `tools/call` request.
///
/// Created only when the caller supplied `_meta.progressToken`. The transport
/// owns the receiving end and writes each message out before the final response.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    token: JsonValue,
    tx: UnboundedSender<JsonValue>,
}

impl ProgressSink {
    /// Report under `token` on `tx`.
    pub fn new(token: JsonValue, tx: UnboundedSender<JsonValue>) -> Self {
        Self { token, tx }
    }

    /// Send a `notifications/progress` message. Dropped silently if the
    /// transport has stopped listening.
    pub fn report(&self, progress: f64, message: &str) {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "notifications/progress",
            "params": {
                "progressToken": self.token,
                "progress": progress,
                "total": 100,
                "message": message
            }
        });
        let _ = self.tx.send(notification);
    }
}
