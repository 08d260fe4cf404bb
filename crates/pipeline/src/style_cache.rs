//! Precomputed catalog voice styles
//!
//! Built once at startup and never mutated afterwards, so it can be shared
//! across request threads behind an `Arc` without locking.

use std::collections::HashMap;
use std::time::Instant;

use voice_tts_core::{Error, Result, StyleEmbedding, VoiceCatalog, VoiceId};

use crate::engine::GatedSynthesizer;

#[derive(Debug)]
pub struct VoiceStyleCache {
    styles: HashMap<VoiceId, StyleEmbedding>,
    default_voice: VoiceId,
}

impl VoiceStyleCache {
    /// Compute the embedding of every catalog voice, once
    pub fn build(catalog: &VoiceCatalog, synthesizer: &GatedSynthesizer) -> Result<Self> {
        let started = Instant::now();
        let mut styles = HashMap::with_capacity(catalog.len());

        for entry in catalog.entries() {
            let style = synthesizer.compute_style(&entry.reference_path).map_err(|e| {
                tracing::error!(
                    voice = %entry.id,
                    path = %entry.reference_path.display(),
                    error = %e,
                    "Failed to compute catalog voice style"
                );
                e
            })?;
            tracing::debug!(voice = %entry.id, dim = style.dim(), "Cached voice style");
            styles.insert(entry.id.clone(), style);
        }

        tracing::info!(
            voices = styles.len(),
            default = %catalog.default_voice(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Voice style cache ready"
        );

        Self::from_embeddings(catalog.default_voice().clone(), styles)
    }

    /// Build from already computed embeddings; the default must be present
    pub fn from_embeddings(
        default_voice: VoiceId,
        styles: HashMap<VoiceId, StyleEmbedding>,
    ) -> Result<Self> {
        if !styles.contains_key(&default_voice) {
            return Err(Error::config(format!(
                "default voice '{}' has no cached style",
                default_voice
            )));
        }
        Ok(Self {
            styles,
            default_voice,
        })
    }

    /// Embedding for a catalog voice
    pub fn lookup(&self, id: &str) -> Result<&StyleEmbedding> {
        self.styles
            .get(id)
            .ok_or_else(|| Error::UnknownVoice(id.to_string()))
    }

    pub fn default_style(&self) -> &StyleEmbedding {
        // Presence is checked in `from_embeddings`
        &self.styles[&self.default_voice]
    }

    pub fn default_voice(&self) -> &VoiceId {
        &self.default_voice
    }

    /// Catalog ids, sorted
    pub fn voices(&self) -> Vec<&VoiceId> {
        let mut ids: Vec<&VoiceId> = self.styles.keys().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
