//! Per-request voice style resolution
//!
//! Priority, first match wins:
//! 1. Uploaded reference recording (transient embedding)
//! 2. Requested catalog voice
//! 3. Default catalog voice

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use voice_tts_core::{
    Error, ResolvedStyle, Result, StyleEmbedding, StyleSource, UnknownVoicePolicy,
    UploadedReference, VoiceId,
};

use crate::engine::GatedSynthesizer;
use crate::style_cache::VoiceStyleCache;

pub struct ReferenceResolver {
    cache: Arc<VoiceStyleCache>,
    synthesizer: Arc<GatedSynthesizer>,
    policy: UnknownVoicePolicy,
    scratch_dir: PathBuf,
}

impl ReferenceResolver {
    pub fn new(
        cache: Arc<VoiceStyleCache>,
        synthesizer: Arc<GatedSynthesizer>,
        policy: UnknownVoicePolicy,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cache,
            synthesizer,
            policy,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn cache(&self) -> &VoiceStyleCache {
        &self.cache
    }

    /// Pick exactly one style for the request
    pub fn resolve(
        &self,
        upload: Option<&UploadedReference>,
        voice: Option<&str>,
    ) -> Result<ResolvedStyle> {
        if let Some(upload) = upload {
            let embedding = self.extract_uploaded(upload)?;
            return Ok(ResolvedStyle {
                embedding,
                source: StyleSource::Uploaded,
            });
        }

        if let Some(voice) = voice {
            match self.cache.lookup(voice) {
                Ok(embedding) => {
                    return Ok(ResolvedStyle {
                        embedding: embedding.clone(),
                        source: StyleSource::Catalog(VoiceId::new(voice)),
                    });
                }
                Err(err @ Error::UnknownVoice(_)) => match self.policy {
                    UnknownVoicePolicy::Reject => return Err(err),
                    UnknownVoicePolicy::FallbackToDefault => {
                        tracing::warn!(
                            voice,
                            default = %self.cache.default_voice(),
                            "Unknown voice requested, using default"
                        );
                    }
                },
                Err(err) => return Err(err),
            }
        }

        Ok(ResolvedStyle {
            embedding: self.cache.default_style().clone(),
            source: StyleSource::Default(self.cache.default_voice().clone()),
        })
    }

    /// Persist the upload to a scoped temp file and extract its style.
    ///
    /// The temp file is removed before returning on every path.
    fn extract_uploaded(&self, upload: &UploadedReference) -> Result<StyleEmbedding> {
        validate_wav_filename(&upload.filename)?;

        let mut file = tempfile::Builder::new()
            .prefix("reference_")
            .suffix(".wav")
            .tempfile_in(&self.scratch_dir)?;
        let written = file
            .write_all(&upload.bytes)
            .and_then(|_| file.flush());
        if let Err(e) = written {
            discard(file);
            return Err(Error::Io(e));
        }

        tracing::debug!(
            path = %file.path().display(),
            bytes = upload.bytes.len(),
            "Extracting style from uploaded reference"
        );

        let style = self.synthesizer.compute_style(file.path());
        let removed = file.close();

        let style = style?;
        removed?;
        Ok(style)
    }
}

/// Drop a temp file, logging instead of failing if deletion goes wrong
fn discard(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary reference");
    }
}

/// Uploaded references must be declared as `.wav`
pub fn validate_wav_filename(filename: &str) -> Result<()> {
    let is_wav = Path::new(filename.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

    if is_wav {
        Ok(())
    } else {
        Err(Error::InvalidAudioFormat(format!(
            "reference file must be a .wav file, got '{}'",
            filename
        )))
    }
}
