//! Core traits and types for the voice TTS service
//!
//! This crate provides foundational types used across all other crates:
//! - Audio segment and synthesis result types
//! - Style embeddings and the voice catalog
//! - Error types
//! - Engine traits (`Segmenter`, `Synthesizer`)

pub mod audio;
pub mod error;
pub mod request;
pub mod style;
pub mod traits;
pub mod voice;

pub use audio::{AudioSegment, SynthesisResult};
pub use error::{Error, Result};
pub use request::{SynthesisRequest, UploadedReference};
pub use style::{ResolvedStyle, StyleEmbedding, StyleSource};
pub use traits::{Segmenter, SynthesisParams, Synthesizer};
pub use voice::{UnknownVoicePolicy, VoiceCatalog, VoiceCatalogEntry, VoiceId};
