//! Incremental decoder for the event stream wire format.
//!
//! Robust to arbitrary chunking: bytes are buffered until a line is
//! complete, so the same byte sequence yields the same events no matter
//! where the transport split it. Each `data:` line carries one record.
//! Blank lines, `:` comments and other SSE fields are skipped.

use super::encoder::DONE_MARKER;
use super::lines::LineBuffer;
use serde_json::Value;
use streamchat_domain::StreamEvent;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Record is not valid UTF-8")]
    InvalidUtf8,
}

/// Decode one record payload (the text after `data:`).
///
/// A payload carrying both `error` and `text` is an error record.
pub fn decode_payload(payload: &str) -> Result<StreamEvent, DecodeError> {
    let payload = payload.trim();
    if payload == DONE_MARKER {
        return Ok(StreamEvent::Done);
    }

    let value: Value = serde_json::from_str(payload)
        .map_err(|e| DecodeError::Malformed(format!("{e}: {}", excerpt(payload))))?;

    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Ok(StreamEvent::Error(message.to_string()));
    }
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return Ok(StreamEvent::Fragment(text.to_string()));
    }
    Err(DecodeError::Malformed(format!(
        "no text or error field: {}",
        excerpt(payload)
    )))
}

fn excerpt(payload: &str) -> String {
    const MAX: usize = 80;
    if payload.chars().count() <= MAX {
        payload.to_string()
    } else {
        let cut: String = payload.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

/// Streaming decoder state.
#[derive(Debug, Default)]
pub struct SseDecoder {
    lines: LineBuffer,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the records it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<StreamEvent, DecodeError>> {
        self.lines
            .push(chunk)
            .into_iter()
            .filter_map(|line| decode_line(&line))
            .collect()
    }

    /// End of input: decode a trailing record that lacked its newline.
    pub fn finish(&mut self) -> Option<Result<StreamEvent, DecodeError>> {
        self.lines.finish().and_then(|line| decode_line(&line))
    }
}

fn decode_line(line: &[u8]) -> Option<Result<StreamEvent, DecodeError>> {
    let line = match std::str::from_utf8(line) {
        Ok(line) => line,
        Err(_) => return Some(Err(DecodeError::InvalidUtf8)),
    };
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let (field, value) = match line.split_once(':') {
        Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };
    if field != "data" {
        return None;
    }
    Some(decode_payload(value))
}
