//! Custom error types for the dashboard client

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::Language;

/// Error body returned by the backend on failure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBody {
    /// Top-level server message
    #[serde(default)]
    pub message: Option<String>,
    /// Per-field validation messages, in server order
    #[serde(default)]
    pub errors: Option<Map<String, Value>>,
}

impl ErrorBody {
    /// Parse a failure body, falling back to an empty body
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// First message of the first field that has validation errors
    fn first_field_message(&self) -> Option<Option<&str>> {
        let errors = self.errors.as_ref().filter(|errors| !errors.is_empty())?;
        let first = errors.values().next()?;
        let message = match first {
            Value::Array(messages) => messages.first().and_then(Value::as_str),
            Value::String(message) => Some(message.as_str()),
            _ => None,
        };
        Some(message.filter(|message| !message.is_empty()))
    }
}

/// Custom error type for the dashboard client
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Request was sent but no response arrived (connect failure, timeout)
    #[error("No response received: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("Server responded with status {status}")]
    Server { status: u16, body: ErrorBody },

    /// Report dispatch was asked for a report that does not exist
    #[error("Unknown report type: {0}")]
    UnknownReportType(String),

    /// Successful response whose body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status of a server failure
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Translate the failure into a single message for inline display.
    ///
    /// Preference order: first field-level validation message, top-level
    /// server message, connectivity message, generic message.
    pub fn user_message(&self, language: Language) -> String {
        let text = messages(language);

        match self {
            ApiError::Server { body, .. } => {
                if let Some(field_message) = body.first_field_message() {
                    return field_message.unwrap_or(text.processing).to_string();
                }
                body.message
                    .as_deref()
                    .filter(|message| !message.is_empty())
                    .unwrap_or(text.server)
                    .to_string()
            }
            ApiError::Network(_) => text.connectivity.to_string(),
            _ => text.unexpected.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Translate any API failure into an Arabic display message
pub fn handle_api_error(err: &ApiError) -> String {
    err.user_message(Language::Ar)
}

struct Messages {
    processing: &'static str,
    server: &'static str,
    connectivity: &'static str,
    unexpected: &'static str,
}

fn messages(language: Language) -> Messages {
    match language {
        Language::Ar => Messages {
            processing: "حدث خطأ في المعالجة",
            server: "حدث خطأ في الخادم",
            connectivity: "خطأ في الاتصال. تحقق من الإنترنت.",
            unexpected: "حدث خطأ غير متوقع",
        },
        Language::En => Messages {
            processing: "An error occurred while processing the request",
            server: "A server error occurred",
            connectivity: "Connection error. Check your internet connection.",
            unexpected: "An unexpected error occurred",
        },
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server_error(status: u16, body: Value) -> ApiError {
        ApiError::Server {
            status,
            body: ErrorBody::from_bytes(body.to_string().as_bytes()),
        }
    }

    #[test]
    fn test_first_field_error_wins() {
        let err = server_error(
            422,
            json!({
                "message": "Validation failed",
                "errors": {
                    "dateFrom": ["تاريخ البداية مطلوب", "second"],
                    "projectId": ["المشروع غير موجود"]
                }
            }),
        );

        assert_eq!(handle_api_error(&err), "تاريخ البداية مطلوب");
    }

    #[test]
    fn test_empty_field_list_uses_processing_message() {
        let err = server_error(422, json!({"errors": {"dateFrom": []}}));
        assert_eq!(handle_api_error(&err), "حدث خطأ في المعالجة");
    }

    #[test]
    fn test_server_message_then_default() {
        let err = server_error(500, json!({"message": "Database unavailable"}));
        assert_eq!(err.user_message(Language::En), "Database unavailable");

        let err = server_error(500, json!({"errors": {}}));
        assert_eq!(err.user_message(Language::En), "A server error occurred");

        let err = ApiError::Server {
            status: 502,
            body: ErrorBody::from_bytes(b"<html>bad gateway</html>"),
        };
        assert_eq!(handle_api_error(&err), "حدث خطأ في الخادم");
    }

    #[test]
    fn test_network_and_generic_messages() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(handle_api_error(&err), "خطأ في الاتصال. تحقق من الإنترنت.");

        let err = ApiError::UnknownReportType("weekly".into());
        assert_eq!(handle_api_error(&err), "حدث خطأ غير متوقع");
        assert_eq!(err.to_string(), "Unknown report type: weekly");
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(server_error(401, json!({})).is_unauthorized());
        assert!(!server_error(403, json!({})).is_unauthorized());
        assert!(!ApiError::Network("timeout".into()).is_unauthorized());
    }
}
