//! Wire encoding of stream events.
//!
//! Every event is one `data:` record terminated by a blank line:
//!
//! ```text
//! data: {"text":"Hel"}
//!
//! data: {"error":"engine unavailable"}
//!
//! data: [DONE]
//! ```
//!
//! Payloads are single-line JSON, so a record never spans more than one
//! `data:` line.

use serde_json::json;
use streamchat_domain::StreamEvent;

/// Payload of the terminal record of a successful stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Payload carried on the `data:` line for `event`.
pub fn encode_payload(event: &StreamEvent) -> String {
    match event {
        StreamEvent::Fragment(text) => json!({ "text": text }).to_string(),
        StreamEvent::Error(message) => json!({ "error": message }).to_string(),
        StreamEvent::Done => DONE_MARKER.to_string(),
    }
}

/// Complete record for `event`, including the blank terminator line.
pub fn encode_frame(event: &StreamEvent) -> String {
    format!("data: {}\n\n", encode_payload(event))
}

/// Comment record; decoders ignore it. Used as a keep-alive.
pub fn encode_comment(text: &str) -> String {
    format!(": {}\n\n", text.replace('\n', " "))
}
