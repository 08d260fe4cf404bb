//! Error types for the voice TTS service

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the voice TTS service
#[derive(Error, Debug)]
pub enum Error {
    // Input validation
    #[error("Text cannot be empty")]
    EmptyText,

    #[error("Text must be less than {max} characters (got {length})")]
    TextTooLong { length: usize, max: usize },

    // Reference audio
    #[error("Invalid audio format: {0}")]
    InvalidAudioFormat(String),

    // Voice catalog
    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    // Engine failures
    #[error("Inference error: {0}")]
    Inference(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Error::Inference(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyText
                | Error::TextTooLong { .. }
                | Error::InvalidAudioFormat(_)
                | Error::UnknownVoice(_)
        )
    }

    /// Short stable label, used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::EmptyText => "empty_text",
            Error::TextTooLong { .. } => "text_too_long",
            Error::InvalidAudioFormat(_) => "invalid_audio_format",
            Error::UnknownVoice(_) => "unknown_voice",
            Error::Inference(_) => "inference",
            Error::Io(_) => "io",
            Error::Config(_) => "config",
        }
    }
}
