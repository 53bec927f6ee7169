//! Conversation relay and its per-call chunk stream

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures_util::stream::FusedStream;
use futures_util::{Stream, StreamExt};
use relay_config::RelayConfig;
use relay_telemetry::RelayMetrics;

use crate::error::RelayError;
use crate::provider::openai::OpenAiProvider;
use crate::provider::{CompletionRequest, FragmentStream, UpstreamProvider};
use crate::types::{ChatMessage, Message, Role, StreamChunk};

/// Forwards conversations to one upstream provider and streams the reply
///
/// Holds only immutable configuration, so a single instance serves any
/// number of concurrent calls.
pub struct Relay {
    provider: Arc<dyn UpstreamProvider>,
    model: String,
    system_prompt: String,
    first_byte_timeout: Duration,
    metrics: RelayMetrics,
}

impl Relay {
    /// Build a relay backed by the configured OpenAI-compatible provider
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let provider = OpenAiProvider::new(&config.upstream)?;
        Ok(Self::new(Arc::new(provider), config))
    }

    /// Build a relay around an arbitrary provider
    pub fn new(provider: Arc<dyn UpstreamProvider>, config: &RelayConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            first_byte_timeout: config.first_byte_timeout,
            metrics: RelayMetrics::new(),
        }
    }

    /// Relay `conversation` upstream and stream back the response
    ///
    /// Validation happens before any upstream work. The returned stream is
    /// only handed out once the provider has produced its first fragment (or
    /// completed without output), so a provider that fails early surfaces
    /// here as [`RelayError::Upstream`] rather than as an empty stream.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Validation`] for an empty or malformed conversation.
    ///   Content that is empty after trimming whitespace counts as empty.
    /// - [`RelayError::Upstream`] if the provider fails before any output
    /// - [`RelayError::FirstByteTimeout`] if no output arrives in time
    pub async fn relay(&self, conversation: &[ChatMessage]) -> Result<RelayStream, RelayError> {
        let started = Instant::now();
        let messages = validate(conversation)?;
        let request = self.outbound_request(messages);

        tracing::debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = conversation.len(),
            "relaying conversation upstream"
        );

        let opened = tokio::time::timeout(self.first_byte_timeout, async {
            let mut upstream = self.provider.stream_completion(&request).await?;
            let first = upstream.next().await;
            Ok::<_, RelayError>((upstream, first))
        })
        .await;

        let (upstream, first) = match opened {
            Ok(Ok(opened)) => opened,
            Ok(Err(e)) => return Err(self.fail_before_output(e.into_upstream())),
            Err(_elapsed) => return Err(self.fail_before_output(RelayError::FirstByteTimeout(self.first_byte_timeout))),
        };

        match first {
            Some(Ok(fragment)) => {
                self.metrics.record_time_to_first_token(&self.model, started.elapsed());
                Ok(RelayStream::new(Some(upstream), Some(fragment), self.model.clone(), started, self.metrics.clone()))
            }
            Some(Err(e)) => Err(self.fail_before_output(e.into_upstream())),
            None => {
                tracing::debug!(model = %self.model, "upstream completed without output");
                Ok(RelayStream::new(None, None, self.model.clone(), started, self.metrics.clone()))
            }
        }
    }

    /// System instruction followed by a copy of the caller's messages
    fn outbound_request(&self, conversation: Vec<Message>) -> CompletionRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Message::system(self.system_prompt.as_str()));
        messages.extend(conversation);

        CompletionRequest {
            model: self.model.clone(),
            messages,
        }
    }

    fn fail_before_output(&self, error: RelayError) -> RelayError {
        tracing::warn!(model = %self.model, error = %error, "relay failed before any output");
        self.metrics.record_outcome(&self.model, "upstream_error");
        error
    }
}

/// Check a caller's conversation and convert it to typed messages
///
/// Whitespace-only content is rejected as empty. Accepted content is
/// forwarded untrimmed.
fn validate(conversation: &[ChatMessage]) -> Result<Vec<Message>, RelayError> {
    if conversation.is_empty() {
        return Err(RelayError::invalid_field("messages", "messages must not be empty"));
    }

    conversation
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let role = message.role.parse::<Role>().map_err(|_| {
                RelayError::invalid_field(
                    format!("messages[{index}].role"),
                    format!(
                        "messages[{index}].role must be one of system, user, assistant (got {:?})",
                        message.role
                    ),
                )
            })?;

            if message.content.trim().is_empty() {
                return Err(RelayError::invalid_field(
                    format!("messages[{index}].content"),
                    format!("messages[{index}].content must not be empty"),
                ));
            }

            Ok(Message::new(role, message.content.clone()))
        })
        .collect()
}

/// Lifecycle of a relay call once its stream exists
///
/// Validation and the wait for the first fragment happen inside
/// [`Relay::relay`]; a [`RelayStream`] starts out `Streaming`. Every other
/// phase is terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPhase {
    /// Chunks are being relayed
    Streaming,
    /// The final chunk was emitted
    Completed,
    /// The caller cancelled or went away
    Cancelled,
    /// The upstream stream broke after partial output
    Failed,
}

impl RelayPhase {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Streaming)
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "stream_interrupted",
        }
    }
}

/// Ordered chunk stream for one relay call
///
/// Yields `Ok` chunks with consecutive `sequence_index` values, ending with
/// either one `is_final` chunk or a single [`RelayError::StreamInterrupted`].
/// Dropping the stream or calling [`RelayStream::cancel`] drops the upstream
/// stream immediately, which aborts the upstream request.
pub struct RelayStream {
    upstream: Option<FragmentStream>,
    pending: Option<String>,
    next_index: u64,
    phase: RelayPhase,
    model: String,
    started: Instant,
    metrics: RelayMetrics,
}

impl RelayStream {
    fn new(
        upstream: Option<FragmentStream>,
        pending: Option<String>,
        model: String,
        started: Instant,
        metrics: RelayMetrics,
    ) -> Self {
        Self {
            upstream,
            pending,
            next_index: 0,
            phase: RelayPhase::Streaming,
            model,
            started,
            metrics,
        }
    }

    /// Current lifecycle phase
    pub const fn phase(&self) -> RelayPhase {
        self.phase
    }

    /// Number of chunks emitted so far
    pub const fn chunks_emitted(&self) -> u64 {
        self.next_index
    }

    /// Stop relaying and release the upstream request
    ///
    /// No further chunks are produced. Has no effect once the stream has
    /// reached a terminal phase.
    pub fn cancel(&mut self) {
        if self.phase == RelayPhase::Streaming {
            self.finish(RelayPhase::Cancelled);
        }
    }

    fn chunk(&mut self, delta: String, is_final: bool) -> StreamChunk {
        let chunk = StreamChunk {
            sequence_index: self.next_index,
            delta,
            is_final,
        };
        self.next_index += 1;
        chunk
    }

    fn complete(&mut self) -> StreamChunk {
        let chunk = self.chunk(String::new(), true);
        self.finish(RelayPhase::Completed);
        chunk
    }

    fn finish(&mut self, phase: RelayPhase) {
        self.phase = phase;
        self.pending = None;
        self.upstream = None;

        let elapsed = self.started.elapsed();
        self.metrics.record_outcome(&self.model, phase.as_str());
        self.metrics.record_stream_end(&self.model, elapsed, self.next_index);

        match phase {
            RelayPhase::Failed => tracing::warn!(
                model = %self.model,
                chunks = self.next_index,
                elapsed_ms = elapsed.as_millis(),
                "relay stream interrupted"
            ),
            _ => tracing::info!(
                model = %self.model,
                chunks = self.next_index,
                elapsed_ms = elapsed.as_millis(),
                outcome = phase.as_str(),
                "relay finished"
            ),
        }
    }
}

impl Stream for RelayStream {
    type Item = Result<StreamChunk, RelayError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.phase.is_terminal() {
            return Poll::Ready(None);
        }

        if let Some(fragment) = this.pending.take() {
            return Poll::Ready(Some(Ok(this.chunk(fragment, false))));
        }

        let Some(upstream) = this.upstream.as_mut() else {
            return Poll::Ready(Some(Ok(this.complete())));
        };

        match upstream.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(fragment))) => Poll::Ready(Some(Ok(this.chunk(fragment, false)))),
            Poll::Ready(Some(Err(e))) => {
                this.finish(RelayPhase::Failed);
                Poll::Ready(Some(Err(e.into_interrupted())))
            }
            Poll::Ready(None) => Poll::Ready(Some(Ok(this.complete()))),
        }
    }
}

impl FusedStream for RelayStream {
    fn is_terminated(&self) -> bool {
        self.phase.is_terminal()
    }
}

impl Drop for RelayStream {
    fn drop(&mut self) {
        // Caller disconnected mid-stream
        if self.phase == RelayPhase::Streaming {
            self.finish(RelayPhase::Cancelled);
        }
    }
}
