//! Wire framings for relayed chunks
//!
//! `sse` emits one `chunk` event per [`StreamChunk`] and an `error` event on
//! interruption. `data_stream` emits the line protocol understood by the
//! AI SDK `useChat` hook: `0:` text parts, a closing `d:` finish part and `3:`
//! error parts.

use axum::response::sse::Event;
use relay_core::HttpError;

use crate::error::RelayError;
use crate::types::StreamChunk;

/// Response header announcing the data stream protocol version
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";

/// Protocol version sent in [`DATA_STREAM_HEADER`]
pub const DATA_STREAM_VERSION: &str = "v1";

/// Content type of a data stream response
pub const DATA_STREAM_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

const FINISH_PART: &str = r#"d:{"finishReason":"stop"}"#;

/// One server-sent event before it is handed to axum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: &'static str,
    pub data: String,
}

impl SseFrame {
    pub fn from_item(item: &Result<StreamChunk, RelayError>) -> Self {
        match item {
            Ok(chunk) => Self {
                event: "chunk",
                data: serde_json::to_string(chunk).unwrap_or_default(),
            },
            Err(e) => Self {
                event: "error",
                data: e.to_body().to_json(),
            },
        }
    }
}

impl From<SseFrame> for Event {
    fn from(frame: SseFrame) -> Self {
        Self::default().event(frame.event).data(frame.data)
    }
}

/// Encode one relay item as data stream lines
pub fn data_stream_lines(item: &Result<StreamChunk, RelayError>) -> String {
    match item {
        Ok(chunk) => {
            let mut out = String::new();
            if !chunk.delta.is_empty() {
                out.push_str("0:");
                out.push_str(&json_string(&chunk.delta));
                out.push('\n');
            }
            if chunk.is_final {
                out.push_str(FINISH_PART);
                out.push('\n');
            }
            out
        }
        Err(e) => format!("3:{}\n", json_string(&e.client_message())),
    }
}

fn json_string(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}
