//! Transport layer helpers for MCP stdio communication.
//!
//! MCP over stdio frames every JSON-RPC message as one line of compact JSON
//! terminated by `\n`. The [`StreamChannel`](super::stream::StreamChannel)
//! reader task uses [`classify_message`] to decide what each incoming frame
//! is.

use serde::Serialize;

use super::error::Result;

/// Classification of an incoming JSON-RPC message.
///
/// - `Response` → oneshot correlation for pending requests
/// - `IncomingRequest` → a server-initiated request (sampling, roots); ignored
/// - `Notification` → logging/progress notifications; ignored
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`).
    Response { id: u64 },
    /// A request from the server (has `id` + `method`).
    IncomingRequest { id: u64 },
    /// A notification (has `method`, no `id`), or a frame with neither.
    Notification,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
pub fn classify_message(json: &serde_json::Value) -> MessageKind {
    let id = json.get("id").and_then(|v| v.as_u64());
    let method = json.get("method").and_then(|v| v.as_str());

    match (id, method) {
        (Some(id), Some(_)) => MessageKind::IncomingRequest { id },
        (Some(id), None) => MessageKind::Response { id },
        _ => MessageKind::Notification,
    }
}

/// Encode one message as a newline-terminated frame.
pub fn encode_frame<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    let mut frame = serde_json::to_vec(message)?;
    frame.push(b'\n');
    Ok(frame)
}
