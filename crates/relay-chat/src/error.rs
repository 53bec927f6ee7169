use std::time::Duration;

use http::StatusCode;
use relay_core::HttpError;
use thiserror::Error;

/// Errors that can end a relay call
///
/// Caller cancellation is not an error; it is the
/// [`RelayPhase::Cancelled`](crate::RelayPhase::Cancelled) terminal phase.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The conversation was malformed; nothing was sent upstream
    #[error("{message}")]
    Validation {
        /// Offending field, e.g. `messages[1].role`
        field: Option<String>,
        message: String,
    },

    /// Provider unreachable, rejected the request, or failed before any output
    #[error("upstream error: {0}")]
    Upstream(String),

    /// No upstream output arrived within the first-byte bound
    #[error("upstream produced no output within {}s", .0.as_secs_f64())]
    FirstByteTimeout(Duration),

    /// Upstream stream ended abnormally after partial output
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    /// Validation failure tied to a specific request field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Validation failure not tied to a single field
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Reclassify an upstream failure observed after output was relayed
    pub(crate) fn into_interrupted(self) -> Self {
        match self {
            Self::Upstream(message) | Self::StreamInterrupted(message) => Self::StreamInterrupted(message),
            other => Self::StreamInterrupted(other.to_string()),
        }
    }

    /// Reclassify a stream failure observed before any output was relayed
    pub(crate) fn into_upstream(self) -> Self {
        match self {
            Self::StreamInterrupted(message) => Self::Upstream(message),
            other => other,
        }
    }
}

impl HttpError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::FirstByteTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::StreamInterrupted(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Upstream(_) | Self::FirstByteTimeout(_) => "upstream_error",
            Self::StreamInterrupted(_) => "stream_interrupted",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }

    fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
