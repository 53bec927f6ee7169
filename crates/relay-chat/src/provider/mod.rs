//! Upstream provider seam

pub mod openai;

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::RelayError;
use crate::types::Message;

/// Ordered text fragments produced by a provider
///
/// Dropping the stream aborts the upstream request.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, RelayError>> + Send>>;

/// Request handed to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Upstream model identifier
    pub model: String,
    /// System instruction followed by the caller's conversation
    pub messages: Vec<Message>,
}

/// A text-generation backend the relay can stream from
///
/// Implementations report every transport or provider failure as
/// [`RelayError::Upstream`], both from `stream_completion` and as stream
/// items. A stream that simply ends is a successful completion.
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Start a streaming completion
    async fn stream_completion(&self, request: &CompletionRequest) -> Result<FragmentStream, RelayError>;
}
