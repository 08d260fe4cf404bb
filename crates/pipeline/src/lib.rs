//! Synthesis request pipeline
//!
//! This crate turns a request into a playable WAV file:
//! - Voice style resolution (upload > requested voice > default)
//! - Sentence-packing text segmentation
//! - Ordered per-segment synthesis through a gated engine
//! - 16-bit WAV output and lifecycle cleanup

pub mod cleanup;
pub mod engine;
pub mod output;
pub mod resolver;
pub mod segmenter;
pub mod service;
pub mod style_cache;
pub mod synthesis;
pub mod wav;

#[cfg(test)]
pub(crate) mod testing;

pub use cleanup::{CleanupReport, CleanupService};
pub use engine::{build_engine, GatedSynthesizer, SimpleSynthesizer};
pub use output::{GeneratedAudioFile, OutputManager};
pub use resolver::ReferenceResolver;
pub use segmenter::{Segments, TextSegmenter};
pub use service::{RenderedAudio, SpeechService};
pub use style_cache::VoiceStyleCache;
pub use synthesis::SynthesisPipeline;

#[cfg(feature = "onnx")]
pub use engine::OnnxSynthesizer;
