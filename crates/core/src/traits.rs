//! Engine traits
//!
//! The inference engine and the text segmentation algorithm are external
//! collaborators. The pipeline only talks to them through these traits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::AudioSegment;
use crate::error::Result;
use crate::style::StyleEmbedding;

/// Splits request text into chunks the synthesizer can handle
pub trait Segmenter: Send + Sync {
    /// Lazily yield non-empty chunks in left-to-right order.
    ///
    /// Calling this again with the same text yields the same sequence.
    fn segment<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a>;
}

/// Hyperparameters passed to every synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    /// Timbre mix weight between reference and predicted style
    pub alpha: f32,
    /// Prosody mix weight between reference and predicted style
    pub beta: f32,
    /// Diffusion sampler step count
    pub diffusion_steps: u32,
    /// Classifier-free guidance scale for the style diffusion
    pub embedding_scale: f32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.7,
            diffusion_steps: 4,
            embedding_scale: 1.0,
        }
    }
}

/// Neural speech engine
pub trait Synthesizer: Send + Sync {
    /// Extract a style embedding from a reference WAV file
    fn compute_style(&self, reference: &Path) -> Result<StyleEmbedding>;

    /// Synthesize one text chunk in the given style
    fn synthesize(
        &self,
        text: &str,
        style: &StyleEmbedding,
        params: &SynthesisParams,
    ) -> Result<AudioSegment>;

    /// Sample rate of every segment this engine produces
    fn sample_rate(&self) -> u32;

    /// Whether concurrent calls from different requests are safe.
    ///
    /// Engines that return `false` are serialized by the pipeline.
    fn is_reentrant(&self) -> bool {
        false
    }
}
