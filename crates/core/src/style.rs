//! Voice style embeddings

use std::fmt;
use std::sync::Arc;

use crate::voice::VoiceId;

/// Opaque vector summarizing a speaker's vocal style.
///
/// Only produced by [`crate::Synthesizer::compute_style`]. The buffer is shared,
/// so clones are cheap and the contents can never change after creation.
#[derive(Clone, PartialEq)]
pub struct StyleEmbedding(Arc<[f32]>);

impl StyleEmbedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values.into())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for StyleEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleEmbedding").field("dim", &self.dim()).finish()
    }
}

/// Where a request's style embedding came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSource {
    /// Extracted from the caller's uploaded reference recording
    Uploaded,
    /// A catalog voice the caller asked for
    Catalog(VoiceId),
    /// The default catalog voice
    Default(VoiceId),
}

impl StyleSource {
    /// Label used in response headers and logs
    pub fn label(&self) -> String {
        match self {
            StyleSource::Uploaded => "uploaded".to_string(),
            StyleSource::Catalog(id) => format!("catalog:{}", id),
            StyleSource::Default(id) => format!("default:{}", id),
        }
    }
}

/// The single embedding chosen for a request
#[derive(Debug, Clone)]
pub struct ResolvedStyle {
    pub embedding: StyleEmbedding,
    pub source: StyleSource,
}
