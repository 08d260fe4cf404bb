//! Output file configuration

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// When generated audio files are deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputRetention {
    /// Keep every file until the service shuts down
    #[default]
    UntilShutdown,
    /// Delete the file as soon as its bytes are loaded into the response
    DeleteAfterResponse,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for generated `audio_*.wav` files
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Directory for transient reference uploads (system temp dir if unset)
    #[serde(default)]
    pub scratch_dir: Option<String>,

    /// Clamp samples to [-1, 1] before 16-bit conversion
    #[serde(default = "default_true")]
    pub clamp_samples: bool,

    /// Retention policy
    #[serde(default)]
    pub retention: OutputRetention,

    /// Background age-based sweep
    #[serde(default)]
    pub sweep: SweepConfig,
}

fn default_output_dir() -> String {
    ".".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            scratch_dir: None,
            clamp_samples: true,
            retention: OutputRetention::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.trim().is_empty() {
            return Err(ConfigError::invalid("output.dir", "must not be empty"));
        }
        self.sweep.validate()
    }
}

/// Periodic deletion of old outputs (off by default)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between sweeps
    #[serde(default = "default_sweep_interval")]
    pub interval_seconds: u64,

    /// Files older than this are deleted
    #[serde(default = "default_max_age")]
    pub max_age_seconds: u64,
}

fn default_sweep_interval() -> u64 {
    300
}
fn default_max_age() -> u64 {
    3600
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: default_sweep_interval(),
            max_age_seconds: default_max_age(),
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.interval_seconds == 0 {
            return Err(ConfigError::invalid("output.sweep.interval_seconds", "must be positive"));
        }
        Ok(())
    }
}
