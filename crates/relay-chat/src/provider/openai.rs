//! OpenAI-compatible provider

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt, stream};
use relay_config::UpstreamConfig;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::{CompletionRequest, FragmentStream, UpstreamProvider};
use crate::error::RelayError;
use crate::protocol::openai::{DONE_SENTINEL, OpenAiErrorResponse, OpenAiRequest, OpenAiStreamChunk};

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Streams chat completions from an OpenAI-compatible API
pub struct OpenAiProvider {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl OpenAiProvider {
    /// Create from upstream configuration
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Internal` if the default base URL cannot be parsed
    pub fn new(config: &UpstreamConfig) -> Result<Self, RelayError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| anyhow::anyhow!("invalid default base URL: {e}"))?,
        };

        if config.api_key.is_none() {
            tracing::warn!(base_url = %base_url, "no upstream api_key configured, requests will be unauthenticated");
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl UpstreamProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn stream_completion(&self, request: &CompletionRequest) -> Result<FragmentStream, RelayError> {
        let wire_request = OpenAiRequest {
            model: &request.model,
            messages: &request.messages,
            stream: true,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut builder = self.client.post(self.completions_url()).json(&wire_request);

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(provider = self.name(), error = %e, "upstream stream request failed");
            RelayError::Upstream(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = self.name(), %status, "upstream returned error");
            let detail = serde_json::from_str::<OpenAiErrorResponse>(&body).map_or(body, |e| e.error.message);
            return Err(RelayError::Upstream(format!("provider returned {status}: {detail}")));
        }

        let events = Box::pin(response.bytes_stream().eventsource());

        Ok(Box::pin(content_fragments(events)))
    }
}

/// Reduce a completion event stream to its non-empty text fragments
///
/// Ends after the `[DONE]` sentinel. An event stream that closes without it
/// ends with an error item so truncation is never mistaken for completion.
fn content_fragments<S, E>(events: S) -> impl Stream<Item = Result<String, RelayError>> + Send
where
    S: Stream<Item = Result<eventsource_stream::Event, E>> + Send + Unpin,
    E: std::fmt::Display,
{
    stream::unfold(Some(events), |state| async move {
        let mut events = state?;

        loop {
            let event = match events.next().await {
                Some(Ok(event)) => event,
                Some(Err(e)) => return Some((Err(RelayError::Upstream(e.to_string())), None)),
                None => {
                    let err = RelayError::Upstream("upstream closed the stream before completion".to_owned());
                    return Some((Err(err), None));
                }
            };

            let data = event.data.trim();
            if data == DONE_SENTINEL {
                return None;
            }

            if let Ok(failure) = serde_json::from_str::<OpenAiErrorResponse>(data) {
                tracing::warn!(error_type = ?failure.error.error_type, "upstream reported an error mid-stream");
                return Some((Err(RelayError::Upstream(failure.error.message)), None));
            }

            match serde_json::from_str::<OpenAiStreamChunk>(data) {
                Ok(chunk) => {
                    if let Some(text) = chunk.text() {
                        return Some((Ok(text.to_owned()), Some(events)));
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, data = %data, "skipping unparseable SSE chunk");
                }
            }
        }
    })
}
