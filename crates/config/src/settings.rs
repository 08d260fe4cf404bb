//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ConfigError, OutputConfig, SynthesisConfig, VoicesConfig};

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Synthesis configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Inference engine selection
    #[serde(default)]
    pub engine: EngineConfig,

    /// Voice catalog
    #[serde(default)]
    pub voices: VoicesConfig,

    /// Generated files
    #[serde(default)]
    pub output: OutputConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.synthesis.validate()?;
        self.engine.validate()?;
        self.voices.validate()?;
        self.output.validate()?;
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size (text plus reference upload)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins (any origin when empty)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::invalid("server.max_upload_bytes", "must be positive"));
        }
        Ok(())
    }
}

/// Available inference engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Built-in development engine (silence output, energy-profile styles)
    #[default]
    Simple,
    /// ONNX models, requires the `onnx` feature
    Onnx,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub kind: EngineKind,

    /// Style encoder ONNX model path
    #[serde(default)]
    pub style_encoder_model: Option<String>,

    /// Acoustic model ONNX path
    #[serde(default)]
    pub synthesis_model: Option<String>,

    /// Intra-op threads per ONNX session
    #[serde(default)]
    pub intra_threads: Option<usize>,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.kind != EngineKind::Onnx {
            return Ok(());
        }

        let model_checks = [
            ("engine.style_encoder_model", &self.style_encoder_model),
            ("engine.synthesis_model", &self.synthesis_model),
        ];

        for (field, path) in model_checks {
            let Some(path) = path else {
                return Err(ConfigError::invalid(field, "required for the onnx engine"));
            };
            if !path.ends_with(".onnx") {
                tracing::warn!("{}: expected .onnx extension, got '{}'", field, path);
            }
            if !Path::new(path).exists() {
                tracing::warn!("Model not found: {} = {}", field, path);
            }
        }
        Ok(())
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable the Prometheus recorder and `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (VOICE_TTS_ prefix, e.g. `VOICE_TTS__SERVER__PORT`)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_TTS")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
