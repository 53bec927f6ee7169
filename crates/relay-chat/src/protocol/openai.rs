//! `OpenAI` chat completion streaming wire format

use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Sentinel data payload that ends a successful stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Streaming chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAiRequest<'a> {
    /// Model identifier
    pub model: &'a str,
    /// Conversation, system instruction first
    pub messages: &'a [Message],
    /// Always `true`; the relay only streams
    pub stream: bool,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// One `data:` payload of the completion stream
#[derive(Debug, Default, Deserialize)]
pub struct OpenAiStreamChunk {
    #[serde(default)]
    pub choices: Vec<OpenAiStreamChoice>,
}

impl OpenAiStreamChunk {
    /// Text carried by the first choice, if any
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

/// Choice within a streaming chunk
#[derive(Debug, Default, Deserialize)]
pub struct OpenAiStreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: OpenAiStreamDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental delta within a streaming choice
#[derive(Debug, Default, Deserialize)]
pub struct OpenAiStreamDelta {
    /// Present on the first chunk only
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Error body, returned for failed requests and occasionally sent mid-stream
#[derive(Debug, Deserialize)]
pub struct OpenAiErrorResponse {
    pub error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct OpenAiErrorDetail {
    pub message: String,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}
