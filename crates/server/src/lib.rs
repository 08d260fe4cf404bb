//! Voice TTS Server
//!
//! Provides the HTTP endpoint for text-to-speech synthesis.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use self::metrics::{init_metrics, metrics_handler};
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Field '{0}' is required")]
    MissingField(&'static str),

    #[error("Voice '{0}' not found")]
    VoiceNotFound(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::VoiceNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Internal details stay in the logs.
    pub fn detail(&self) -> String {
        match self {
            ServerError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl From<voice_tts_core::Error> for ServerError {
    fn from(err: voice_tts_core::Error) -> Self {
        use voice_tts_core::Error;

        match err {
            Error::UnknownVoice(id) => ServerError::VoiceNotFound(id),
            err if err.is_client_error() => ServerError::InvalidRequest(err.to_string()),
            err => ServerError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(serde_json::json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_tts_core::Error;

    #[test]
    fn test_core_error_status_mapping() {
        let cases = [
            (Error::EmptyText, StatusCode::BAD_REQUEST),
            (Error::TextTooLong { length: 50_001, max: 50_000 }, StatusCode::BAD_REQUEST),
            (Error::InvalidAudioFormat("x.mp3".into()), StatusCode::BAD_REQUEST),
            (Error::UnknownVoice("x-zz-9".into()), StatusCode::NOT_FOUND),
            (Error::inference("engine crashed"), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Io(std::io::Error::other("disk full")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(StatusCode::from(ServerError::from(err)), status);
        }
    }

    #[test]
    fn test_internal_detail_is_generic() {
        let err = ServerError::from(Error::inference("CUDA out of memory"));
        assert_eq!(err.detail(), "Internal server error");

        let err = ServerError::from(Error::EmptyText);
        assert_eq!(err.detail(), "Text cannot be empty");
    }

    #[test]
    fn test_missing_field_is_unprocessable() {
        assert_eq!(ServerError::MissingField("text").status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
