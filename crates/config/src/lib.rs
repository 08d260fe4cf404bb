//! Configuration management for the voice TTS service
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/<env>`)
//! - Environment variables (VOICE_TTS_ prefix, `__` separator)

pub mod output;
pub mod settings;
pub mod synthesis;
pub mod voices;

pub use output::{OutputConfig, OutputRetention, SweepConfig};
pub use settings::{load_settings, EngineConfig, EngineKind, ObservabilityConfig, ServerConfig, Settings};
pub use synthesis::{SegmenterConfig, SynthesisConfig};
pub use voices::{VoiceEntryConfig, VoicesConfig, BUILTIN_VOICES};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for voice_tts_core::Error {
    fn from(err: ConfigError) -> Self {
        voice_tts_core::Error::Config(err.to_string())
    }
}
