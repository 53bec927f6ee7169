use http::StatusCode;
use serde::Serialize;

/// Trait for domain errors that can be converted to HTTP responses
///
/// Feature crates implement this on their error enums; the HTTP layer owns
/// the conversion into an actual response so domain errors stay decoupled
/// from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error kind (e.g. `validation_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;

    /// Offending request field, for field-level error display
    fn field(&self) -> Option<&str> {
        None
    }

    /// JSON body describing this error
    fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                error_type: self.error_type().to_owned(),
                message: self.client_message(),
                field: self.field().map(str::to_owned),
            },
        }
    }
}

/// Error response envelope: `{"error": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error details within an [`ErrorBody`]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorBody {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"error":{"type":"internal_error","message":""}}"#.to_owned())
    }
}
