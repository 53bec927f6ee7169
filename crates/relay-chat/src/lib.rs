//! Streaming chat relay
//!
//! Validates a caller's conversation, prepends the configured system
//! instruction, forwards it to an OpenAI-compatible provider, and re-emits the
//! provider's output as an ordered, cancellable stream of [`StreamChunk`]s.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod error;
#[cfg(feature = "http")]
pub mod framing;
#[cfg(feature = "http")]
mod handler;
pub mod protocol;
pub mod provider;
pub mod relay;
pub mod types;

pub use error::RelayError;
#[cfg(feature = "http")]
pub use handler::{ChatState, chat_router};
pub use provider::{CompletionRequest, FragmentStream, UpstreamProvider};
pub use relay::{Relay, RelayPhase, RelayStream};
pub use types::{ChatMessage, ChatRequest, Message, Role, StreamChunk};
