//! Inference engines
//!
//! Features:
//! - Explicit reentrancy gate around any `Synthesizer`
//! - Built-in development engine
//! - ONNX engine (behind the `onnx` feature)

mod simple;
#[cfg(feature = "onnx")]
mod onnx;

pub use simple::SimpleSynthesizer;
#[cfg(feature = "onnx")]
pub use onnx::OnnxSynthesizer;

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use voice_tts_config::{EngineKind, Settings};
use voice_tts_core::{AudioSegment, Result, StyleEmbedding, SynthesisParams, Synthesizer};

/// Synthesizer wrapper that serializes calls when the engine is not reentrant.
///
/// Both style extraction and synthesis go through the same gate, so a single
/// engine instance never sees overlapping calls from different requests.
pub struct GatedSynthesizer {
    inner: Arc<dyn Synthesizer>,
    gate: Option<Mutex<()>>,
}

impl GatedSynthesizer {
    /// Gate only if the engine says it is not reentrant
    pub fn new(inner: Arc<dyn Synthesizer>) -> Self {
        Self::with_serialization(inner, false)
    }

    /// Gate if the engine is not reentrant or `force_serial` is set
    pub fn with_serialization(inner: Arc<dyn Synthesizer>, force_serial: bool) -> Self {
        let serialized = force_serial || !inner.is_reentrant();
        Self {
            inner,
            gate: serialized.then(|| Mutex::new(())),
        }
    }

    /// Whether calls are serialized
    pub fn is_serialized(&self) -> bool {
        self.gate.is_some()
    }

    pub fn compute_style(&self, reference: &Path) -> Result<StyleEmbedding> {
        let _guard = self.gate.as_ref().map(|gate| gate.lock());
        self.inner.compute_style(reference)
    }

    pub fn synthesize(
        &self,
        text: &str,
        style: &StyleEmbedding,
        params: &SynthesisParams,
    ) -> Result<AudioSegment> {
        let _guard = self.gate.as_ref().map(|gate| gate.lock());
        self.inner.synthesize(text, style, params)
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }
}

/// Create the engine selected in settings
pub fn build_engine(settings: &Settings) -> Result<Arc<dyn Synthesizer>> {
    match settings.engine.kind {
        EngineKind::Simple => Ok(Arc::new(SimpleSynthesizer::new(settings.synthesis.sample_rate))),
        #[cfg(feature = "onnx")]
        EngineKind::Onnx => Ok(Arc::new(OnnxSynthesizer::from_config(
            &settings.engine,
            settings.synthesis.sample_rate,
        )?)),
        #[cfg(not(feature = "onnx"))]
        EngineKind::Onnx => Err(voice_tts_core::Error::config(
            "engine.kind = onnx requires building with the `onnx` feature",
        )),
    }
}
