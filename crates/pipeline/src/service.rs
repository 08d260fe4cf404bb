//! Request facade
//!
//! Composes style resolution, synthesis and output into one blocking call.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use voice_tts_config::{OutputRetention, Settings};
use voice_tts_core::{Result, StyleSource, SynthesisRequest, Synthesizer};

use crate::engine::GatedSynthesizer;
use crate::output::{GeneratedAudioFile, OutputManager};
use crate::resolver::ReferenceResolver;
use crate::segmenter::TextSegmenter;
use crate::style_cache::VoiceStyleCache;
use crate::synthesis::SynthesisPipeline;

/// A finished request
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    pub file: GeneratedAudioFile,
    /// Complete WAV file contents
    pub bytes: Vec<u8>,
    pub source: StyleSource,
    pub sample_rate: u32,
    pub duration_secs: f64,
}

pub struct SpeechService {
    resolver: ReferenceResolver,
    pipeline: SynthesisPipeline,
    output: Arc<OutputManager>,
    retention: OutputRetention,
}

impl SpeechService {
    /// Build the full stack from settings.
    ///
    /// Creates the output and scratch directories and computes every catalog
    /// voice style, so this is slow and should run once at startup.
    pub fn from_settings(settings: &Settings, engine: Arc<dyn Synthesizer>) -> Result<Self> {
        let synthesis = &settings.synthesis;
        let gated = Arc::new(GatedSynthesizer::with_serialization(
            engine,
            synthesis.serialize_engine_calls,
        ));
        tracing::info!(
            serialized = gated.is_serialized(),
            sample_rate = gated.sample_rate(),
            "Engine ready"
        );

        let catalog = settings.voices.catalog()?;
        let cache = Arc::new(VoiceStyleCache::build(&catalog, &gated)?);

        let output_dir = PathBuf::from(&settings.output.dir);
        std::fs::create_dir_all(&output_dir)?;
        let scratch_dir = match &settings.output.scratch_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                PathBuf::from(dir)
            }
            None => std::env::temp_dir(),
        };

        let resolver = ReferenceResolver::new(
            cache,
            gated.clone(),
            settings.voices.unknown_voice_policy,
            scratch_dir,
        );
        let pipeline = SynthesisPipeline::new(
            Arc::new(TextSegmenter::new(&synthesis.segmenter)),
            gated,
            synthesis.params(),
            synthesis.max_text_chars,
        );
        let output = Arc::new(OutputManager::new(output_dir, settings.output.clamp_samples));

        Ok(Self::from_parts(resolver, pipeline, output, settings.output.retention))
    }

    pub fn from_parts(
        resolver: ReferenceResolver,
        pipeline: SynthesisPipeline,
        output: Arc<OutputManager>,
        retention: OutputRetention,
    ) -> Self {
        Self {
            resolver,
            pipeline,
            output,
            retention,
        }
    }

    pub fn cache(&self) -> &VoiceStyleCache {
        self.resolver.cache()
    }

    pub fn output(&self) -> &Arc<OutputManager> {
        &self.output
    }

    /// Run one request end to end. Blocking.
    pub fn render(&self, request: &SynthesisRequest) -> Result<RenderedAudio> {
        let started = Instant::now();

        // Reject bad text before paying for style extraction
        self.pipeline.validate(&request.text)?;

        let style = self
            .resolver
            .resolve(request.uploaded_reference(), request.requested_voice())?;
        tracing::debug!(source = %style.source.label(), "Resolved voice style");

        let result = self.pipeline.synthesize(&request.text, &style.embedding)?;
        let file = self.output.write(&result)?;
        let bytes = std::fs::read(&file.path)?;

        if self.retention == OutputRetention::DeleteAfterResponse {
            if let Err(e) = self.output.remove(&file) {
                tracing::warn!(file = %file.filename, error = %e, "Failed to delete delivered audio");
            }
        }

        tracing::info!(
            file = %file.filename,
            source = %style.source.label(),
            duration_secs = result.duration_secs(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rendered speech"
        );

        Ok(RenderedAudio {
            file,
            bytes,
            source: style.source,
            sample_rate: result.sample_rate,
            duration_secs: result.duration_secs(),
        })
    }
}
