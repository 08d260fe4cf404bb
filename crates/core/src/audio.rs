//! Audio buffers produced by the synthesizer

/// Audio produced for a single text chunk
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    /// Mono samples, nominally in [-1, 1]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }
}

/// Concatenated audio for a whole request, in chunk order
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    /// Sample rate in Hz (uniform across segments)
    pub sample_rate: u32,
    /// Mono samples
    pub samples: Vec<f32>,
}

impl SynthesisResult {
    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
