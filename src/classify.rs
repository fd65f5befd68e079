//! Classification of API and runtime failures.
//!
//! Every failure the console can observe is folded into a small taxonomy so
//! the UI can pick a message and decide whether the session is gone. Raw
//! errors never reach the status bar.

use serde::Serialize;
use serde_json::Value;

use crate::error::ExportError;

/// Failure categories shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Server,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::Authorization => "authorization",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Fallback copy used when no specific message was captured.
    pub fn generic_message(self) -> &'static str {
        match self {
            ErrorKind::Network => "Network error. Please check your connection and try again.",
            ErrorKind::Validation => "The submitted data is invalid. Please review and try again.",
            ErrorKind::Authentication => "Your session has expired. Please log in again.",
            ErrorKind::Authorization => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::Server => "Server error. Please try again later.",
            ErrorKind::Unknown => "An unexpected error occurred.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a failed API call: an HTTP code or a sentinel for failures
/// below the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiStatus {
    Http(u16),
    /// The request never produced a response.
    FetchError,
    /// A response arrived but its body could not be parsed.
    ParsingError,
    Other(String),
}

impl ApiStatus {
    /// Maps the sentinel strings used for transport-level failures.
    pub fn from_sentinel(value: &str) -> Self {
        match value {
            "FETCH_ERROR" => ApiStatus::FetchError,
            "PARSING_ERROR" => ApiStatus::ParsingError,
            other => ApiStatus::Other(other.to_string()),
        }
    }
}

/// Structured failure returned by the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: ApiStatus,
    /// Decoded error body, when the server sent one.
    pub data: Option<Value>,
    /// Transport error text for sentinel statuses.
    pub error: Option<String>,
}

impl ApiFailure {
    pub fn http(code: u16, data: Option<Value>) -> Self {
        Self {
            status: ApiStatus::Http(code),
            data,
            error: None,
        }
    }

    pub fn fetch(error: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::FetchError,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn parsing(error: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::ParsingError,
            data: None,
            error: Some(error.into()),
        }
    }

    fn payload_field(&self, field: &str) -> Option<String> {
        self.data
            .as_ref()
            .and_then(|d| d.get(field))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn payload_message(&self) -> Option<String> {
        self.payload_field("message")
            .or_else(|| self.payload_field("error"))
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            ApiStatus::Http(code) => write!(f, "HTTP {}", code),
            ApiStatus::FetchError => write!(f, "FETCH_ERROR"),
            ApiStatus::ParsingError => write!(f, "PARSING_ERROR"),
            ApiStatus::Other(s) => write!(f, "{}", s),
        }?;
        if let Some(msg) = self.payload_message().or_else(|| self.error.clone()) {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}

/// Anything the UI may catch.
#[derive(Debug, Clone, PartialEq)]
pub enum CaughtError {
    Api(ApiFailure),
    /// A plain error that only carries a message.
    Exception(String),
    /// Some other value, kept for diagnostics.
    Other(String),
}

impl From<ApiFailure> for CaughtError {
    fn from(failure: ApiFailure) -> Self {
        CaughtError::Api(failure)
    }
}

impl From<reqwest::Error> for CaughtError {
    fn from(err: reqwest::Error) -> Self {
        let failure = if let Some(status) = err.status() {
            ApiFailure::http(status.as_u16(), None)
        } else if err.is_decode() {
            ApiFailure::parsing(err.to_string())
        } else {
            ApiFailure::fetch(err.to_string())
        };
        CaughtError::Api(failure)
    }
}

impl From<&ExportError> for CaughtError {
    fn from(err: &ExportError) -> Self {
        CaughtError::Exception(err.to_string())
    }
}

/// Result of classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// Specific message captured from the failure, if any.
    pub message: Option<String>,
    /// HTTP status of the original failure.
    pub status: Option<u16>,
    /// Raw diagnostic detail for unrecognised values.
    pub details: Option<String>,
}

impl ClassifiedError {
    fn new(kind: ErrorKind, status: Option<u16>) -> Self {
        Self {
            kind,
            message: None,
            status,
            details: None,
        }
    }

    fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }
}

/// Folds a caught failure into the error taxonomy.
pub fn parse_api_error(error: &CaughtError) -> ClassifiedError {
    match error {
        CaughtError::Api(failure) => classify_failure(failure),
        CaughtError::Exception(message) => ClassifiedError::new(ErrorKind::Unknown, None)
            .with_message(Some(message.clone()).filter(|m| !m.is_empty())),
        CaughtError::Other(raw) => ClassifiedError {
            details: Some(raw.clone()),
            ..ClassifiedError::new(ErrorKind::Unknown, None)
        },
    }
}

fn classify_failure(failure: &ApiFailure) -> ClassifiedError {
    match &failure.status {
        ApiStatus::Http(code) => {
            let code = *code;
            match code {
                401 => ClassifiedError::new(ErrorKind::Authentication, Some(code)),
                403 => ClassifiedError::new(ErrorKind::Authorization, Some(code)),
                404 => ClassifiedError::new(ErrorKind::NotFound, Some(code)),
                422 => ClassifiedError::new(ErrorKind::Validation, Some(code))
                    .with_message(failure.payload_field("message")),
                500 | 502 | 503 => ClassifiedError::new(ErrorKind::Server, Some(code)),
                _ => ClassifiedError::new(ErrorKind::Unknown, Some(code))
                    .with_message(failure.payload_message()),
            }
        }
        ApiStatus::FetchError => ClassifiedError {
            details: failure.error.clone(),
            ..ClassifiedError::new(ErrorKind::Network, None)
        },
        ApiStatus::ParsingError => ClassifiedError {
            details: failure.error.clone(),
            ..ClassifiedError::new(ErrorKind::Validation, None)
        }
        .with_message(Some("The server returned an unreadable response.".to_string())),
        ApiStatus::Other(sentinel) => ClassifiedError {
            details: Some(sentinel.clone()),
            ..ClassifiedError::new(ErrorKind::Unknown, None)
        }
        .with_message(failure.payload_message().or_else(|| failure.error.clone())),
    }
}

/// Only an expired or invalid session (401) forces a logout. A 403 means the
/// user is signed in but lacks permission.
pub fn should_logout(error: &ClassifiedError) -> bool {
    error.kind == ErrorKind::Authentication && error.status == Some(401)
}

/// Message for the status bar.
pub fn user_message(error: &ClassifiedError) -> String {
    error
        .message
        .clone()
        .unwrap_or_else(|| error.kind.generic_message().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(code: u16) -> CaughtError {
        CaughtError::Api(ApiFailure::http(code, None))
    }

    #[test]
    fn test_status_code_mapping() {
        let cases = [
            (401, ErrorKind::Authentication),
            (403, ErrorKind::Authorization),
            (404, ErrorKind::NotFound),
            (422, ErrorKind::Validation),
            (500, ErrorKind::Server),
            (502, ErrorKind::Server),
            (503, ErrorKind::Server),
            (418, ErrorKind::Unknown),
        ];
        for (code, kind) in cases {
            let classified = parse_api_error(&http(code));
            assert_eq!(classified.kind, kind, "status {}", code);
            assert_eq!(classified.status, Some(code));
        }
    }

    #[test]
    fn test_sentinels() {
        let network = parse_api_error(&ApiFailure::fetch("connection refused").into());
        assert_eq!(network.kind, ErrorKind::Network);
        assert_eq!(network.details.as_deref(), Some("connection refused"));

        let parsing = parse_api_error(&CaughtError::Api(ApiFailure {
            status: ApiStatus::from_sentinel("PARSING_ERROR"),
            data: None,
            error: Some("expected value".into()),
        }));
        assert_eq!(parsing.kind, ErrorKind::Validation);

        assert_eq!(ApiStatus::from_sentinel("FETCH_ERROR"), ApiStatus::FetchError);
        assert_eq!(
            ApiStatus::from_sentinel("TIMEOUT_ERROR"),
            ApiStatus::Other("TIMEOUT_ERROR".into())
        );
    }

    #[test]
    fn test_validation_message_from_payload() {
        let err = CaughtError::Api(ApiFailure::http(
            422,
            Some(json!({"message": "Price must be positive"})),
        ));
        let classified = parse_api_error(&err);
        assert_eq!(user_message(&classified), "Price must be positive");
    }

    #[test]
    fn test_unknown_status_uses_error_field() {
        let err = CaughtError::Api(ApiFailure::http(409, Some(json!({"error": "Duplicate code"}))));
        let classified = parse_api_error(&err);
        assert_eq!(classified.kind, ErrorKind::Unknown);
        assert_eq!(classified.message.as_deref(), Some("Duplicate code"));
    }

    #[test]
    fn test_exception_and_other() {
        let exc = parse_api_error(&CaughtError::Exception("disk full".into()));
        assert_eq!(exc.kind, ErrorKind::Unknown);
        assert_eq!(user_message(&exc), "disk full");

        let other = parse_api_error(&CaughtError::Other("42".into()));
        assert_eq!(other.kind, ErrorKind::Unknown);
        assert_eq!(other.details.as_deref(), Some("42"));
        assert_eq!(user_message(&other), "An unexpected error occurred.");
    }

    #[test]
    fn test_should_logout_only_on_401() {
        assert!(should_logout(&parse_api_error(&http(401))));
        assert!(!should_logout(&parse_api_error(&http(403))));
        assert!(!should_logout(&parse_api_error(&http(500))));
        let forged = ClassifiedError {
            kind: ErrorKind::Authentication,
            message: None,
            status: None,
            details: None,
        };
        assert!(!should_logout(&forged));
    }

    #[test]
    fn test_generic_copy_fallback() {
        let classified = parse_api_error(&http(403));
        assert_eq!(
            user_message(&classified),
            "You do not have permission to perform this action."
        );
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let v = serde_json::to_value(ErrorKind::NotFound).unwrap();
        assert_eq!(v, json!("not_found"));
    }
}
