//! Ordered segment-by-segment synthesis

use std::sync::Arc;
use std::time::Instant;

use voice_tts_core::{Error, Result, Segmenter, StyleEmbedding, SynthesisParams, SynthesisResult};

use crate::engine::GatedSynthesizer;

pub struct SynthesisPipeline {
    segmenter: Arc<dyn Segmenter>,
    synthesizer: Arc<GatedSynthesizer>,
    params: SynthesisParams,
    max_text_chars: usize,
}

impl SynthesisPipeline {
    pub fn new(
        segmenter: Arc<dyn Segmenter>,
        synthesizer: Arc<GatedSynthesizer>,
        params: SynthesisParams,
        max_text_chars: usize,
    ) -> Self {
        Self {
            segmenter,
            synthesizer,
            params,
            max_text_chars,
        }
    }

    /// Reject empty or oversized text
    pub fn validate(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::EmptyText);
        }
        let length = text.chars().count();
        if length > self.max_text_chars {
            return Err(Error::TextTooLong {
                length,
                max: self.max_text_chars,
            });
        }
        Ok(())
    }

    /// Synthesize every chunk in order and concatenate.
    ///
    /// Chunks are never synthesized concurrently: the output order is the
    /// spoken order.
    pub fn synthesize(&self, text: &str, style: &StyleEmbedding) -> Result<SynthesisResult> {
        self.validate(text)?;

        let started = Instant::now();
        let sample_rate = self.synthesizer.sample_rate();
        let mut samples = Vec::new();
        let mut segments = 0usize;

        tracing::debug!(chars = text.chars().count(), text, "Synthesizing request text");

        for (index, chunk) in self.segmenter.segment(text).enumerate() {
            tracing::debug!(index, chars = chunk.chars().count(), chunk = %chunk, "Synthesizing segment");

            let segment = self.synthesizer.synthesize(&chunk, style, &self.params)?;
            if segment.sample_rate != sample_rate {
                return Err(Error::inference(format!(
                    "segment {} has sample rate {} Hz, expected {} Hz",
                    index, segment.sample_rate, sample_rate
                )));
            }

            samples.extend_from_slice(&segment.samples);
            segments += 1;
        }

        if segments == 0 {
            return Err(Error::EmptyText);
        }

        tracing::info!(
            segments,
            samples = samples.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Synthesis complete"
        );

        Ok(SynthesisResult {
            sample_rate,
            samples,
        })
    }
}
