use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::prompt::DEFAULT_SYSTEM_PROMPT;

/// Chat relay configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Upstream model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Business-context instruction prepended to every conversation
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Bound on the wait for the first upstream fragment (e.g. "20s")
    #[serde(default = "default_first_byte_timeout", deserialize_with = "crate::duration::deserialize")]
    pub first_byte_timeout: Duration,
    /// Route the relay endpoint is mounted on
    #[serde(default = "default_path")]
    pub path: String,
    /// Framing used for the streamed response body
    #[serde(default)]
    pub framing: Framing,
    /// Upstream provider connection settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
            first_byte_timeout: default_first_byte_timeout(),
            path: default_path(),
            framing: Framing::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Streaming body framing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// `text/event-stream` with one `chunk` event per stream chunk
    #[default]
    Sse,
    /// Line-oriented data stream protocol understood by `useChat` widgets
    DataStream,
}

/// OpenAI-compatible upstream provider settings
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Bearer credential for the provider
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override (defaults to the public `OpenAI` API)
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Sampling temperature forwarded to the provider
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Maximum tokens to generate
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_model() -> String {
    "gpt-4o".to_owned()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_owned()
}

const fn default_first_byte_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_path() -> String {
    "/api/chat".to_owned()
}
