//! Synthesis configuration

use serde::{Deserialize, Serialize};
use voice_tts_core::SynthesisParams;

use crate::ConfigError;

/// Synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Output sample rate of the engine (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Timbre mix weight
    #[serde(default = "default_alpha")]
    pub alpha: f32,

    /// Prosody mix weight
    #[serde(default = "default_beta")]
    pub beta: f32,

    /// Diffusion steps per segment
    #[serde(default = "default_diffusion_steps")]
    pub diffusion_steps: u32,

    /// Style guidance scale
    #[serde(default = "default_embedding_scale")]
    pub embedding_scale: f32,

    /// Maximum request text length in characters
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Serialize engine calls across requests even if the engine claims reentrancy
    #[serde(default = "default_true")]
    pub serialize_engine_calls: bool,

    /// Text segmentation
    #[serde(default)]
    pub segmenter: SegmenterConfig,
}

fn default_sample_rate() -> u32 {
    24_000
}
fn default_alpha() -> f32 {
    0.3
}
fn default_beta() -> f32 {
    0.7
}
fn default_diffusion_steps() -> u32 {
    4
}
fn default_embedding_scale() -> f32 {
    1.0
}
fn default_max_text_chars() -> usize {
    50_000
}
fn default_true() -> bool {
    true
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            alpha: default_alpha(),
            beta: default_beta(),
            diffusion_steps: default_diffusion_steps(),
            embedding_scale: default_embedding_scale(),
            max_text_chars: default_max_text_chars(),
            serialize_engine_calls: true,
            segmenter: SegmenterConfig::default(),
        }
    }
}

impl SynthesisConfig {
    /// Hyperparameters handed to the engine for every segment
    pub fn params(&self) -> SynthesisParams {
        SynthesisParams {
            alpha: self.alpha,
            beta: self.beta,
            diffusion_steps: self.diffusion_steps,
            embedding_scale: self.embedding_scale,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::invalid("synthesis.sample_rate", "must be positive"));
        }
        if self.diffusion_steps == 0 {
            return Err(ConfigError::invalid("synthesis.diffusion_steps", "must be at least 1"));
        }
        if self.max_text_chars == 0 {
            return Err(ConfigError::invalid("synthesis.max_text_chars", "must be positive"));
        }
        for (field, value) in [("synthesis.alpha", self.alpha), ("synthesis.beta", self.beta)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, format!("{} is outside [0, 1]", value)));
            }
        }
        self.segmenter.validate()
    }
}

/// Sentence-packing segmenter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// A chunk may end at a sentence boundary once it reaches this many characters
    #[serde(default = "default_desired_length")]
    pub desired_length: usize,

    /// A chunk is closed before it would exceed this many characters
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_desired_length() -> usize {
    100
}
fn default_max_length() -> usize {
    200
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            desired_length: default_desired_length(),
            max_length: default_max_length(),
        }
    }
}

impl SegmenterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::invalid("synthesis.segmenter.max_length", "must be positive"));
        }
        if self.desired_length > self.max_length {
            return Err(ConfigError::invalid(
                "synthesis.segmenter.desired_length",
                format!(
                    "desired length {} exceeds max length {}",
                    self.desired_length, self.max_length
                ),
            ));
        }
        Ok(())
    }
}
