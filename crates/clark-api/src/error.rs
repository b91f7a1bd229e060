//! API error types and JSON error response formatting.
//!
//! Every failure is returned as `{"error": "<message>"}` with the status
//! code of its variant.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use clark_chat::ChatError;
use clark_speech::SpeechError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing, empty or unparseable input.
    BadRequest(String),
    /// 404 Not Found - resource does not exist.
    NotFound(String),
    /// 500 Internal Server Error - the turn failed downstream.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::InvalidAudioId(_) | SpeechError::NotFound(_) => {
                ApiError::NotFound("Audio file not found".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clark_chat::LlmError;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::BadRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound(String::new()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(String::new()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_chat_error() {
        assert!(matches!(
            ApiError::from(ChatError::EmptyMessage),
            ApiError::BadRequest(_)
        ));
        assert!(matches!(
            ApiError::from(ChatError::MessageTooLong(4000)),
            ApiError::BadRequest(_)
        ));
        match ApiError::from(ChatError::Llm(LlmError::Http("timed out".to_string()))) {
            ApiError::Internal(msg) => assert_eq!(msg, "LLM error: HTTP error: timed out"),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn test_from_speech_error() {
        assert!(matches!(
            ApiError::from(SpeechError::InvalidAudioId("../x".to_string())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(SpeechError::Storage("disk".to_string())),
            ApiError::Internal(_)
        ));
    }
}
