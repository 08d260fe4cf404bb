//! Built-in development engine
//!
//! Produces deterministic style embeddings from the reference recording's
//! energy profile and silent audio sized to the text, so the service can run
//! end to end without model weights.

use std::path::Path;

use voice_tts_core::{AudioSegment, Error, Result, StyleEmbedding, SynthesisParams, Synthesizer};

use crate::wav;

/// Style vector size (acoustic + prosodic halves)
pub const STYLE_DIM: usize = 256;

/// Seconds of output per input character
const SECONDS_PER_CHAR: f32 = 0.05;

#[derive(Debug, Clone)]
pub struct SimpleSynthesizer {
    sample_rate: u32,
}

impl SimpleSynthesizer {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl Synthesizer for SimpleSynthesizer {
    fn compute_style(&self, reference: &Path) -> Result<StyleEmbedding> {
        let audio = wav::read_mono(reference)?;
        if audio.samples.is_empty() {
            return Err(Error::InvalidAudioFormat(
                "reference audio contains no samples".to_string(),
            ));
        }

        // RMS per frame, frames spread evenly over the recording
        let frame_len = audio.samples.len().div_ceil(STYLE_DIM);
        let mut values: Vec<f32> = audio
            .samples
            .chunks(frame_len)
            .map(|frame| (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt())
            .collect();
        values.resize(STYLE_DIM, 0.0);

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            values.iter_mut().for_each(|v| *v /= norm);
        }

        Ok(StyleEmbedding::new(values))
    }

    fn synthesize(
        &self,
        text: &str,
        _style: &StyleEmbedding,
        _params: &SynthesisParams,
    ) -> Result<AudioSegment> {
        let per_char = (self.sample_rate as f32 * SECONDS_PER_CHAR) as usize;
        let duration_samples = text.chars().count() * per_char;
        Ok(AudioSegment::new(vec![0.0f32; duration_samples], self.sample_rate))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_reentrant(&self) -> bool {
        true
    }
}
