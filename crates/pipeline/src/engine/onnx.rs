//! ONNX engine
//!
//! Two exported graphs:
//! - style encoder: `audio` [1, n] f32 -> `style` [1, d] f32
//! - acoustic model: `tokens` [1, n] i64, `style` [1, d] f32, `alpha` [1] f32,
//!   `beta` [1] f32, `diffusion_steps` [1] i64, `embedding_scale` [1] f32
//!   -> `audio` [n] f32 at the configured sample rate

use std::path::Path;

use ndarray::{Array1, Array2};
use ort::{GraphOptimizationLevel, Session};
use voice_tts_config::EngineConfig;
use voice_tts_core::{AudioSegment, Error, Result, StyleEmbedding, SynthesisParams, Synthesizer};

use crate::wav;

pub struct OnnxSynthesizer {
    style_encoder: Session,
    acoustic: Session,
    sample_rate: u32,
}

impl OnnxSynthesizer {
    pub fn from_config(config: &EngineConfig, sample_rate: u32) -> Result<Self> {
        let style_path = config
            .style_encoder_model
            .as_deref()
            .ok_or_else(|| Error::config("engine.style_encoder_model is not set"))?;
        let acoustic_path = config
            .synthesis_model
            .as_deref()
            .ok_or_else(|| Error::config("engine.synthesis_model is not set"))?;
        let threads = config.intra_threads.unwrap_or(2);

        tracing::info!(style_encoder = %style_path, acoustic = %acoustic_path, "Loading ONNX engine");

        Ok(Self {
            style_encoder: load_session(Path::new(style_path), threads)?,
            acoustic: load_session(Path::new(acoustic_path), threads)?,
            sample_rate,
        })
    }
}

fn load_session(path: &Path, threads: usize) -> Result<Session> {
    Session::builder()
        .map_err(model_error)?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(model_error)?
        .with_intra_threads(threads)
        .map_err(model_error)?
        .commit_from_file(path)
        .map_err(model_error)
}

fn model_error(err: ort::Error) -> Error {
    Error::inference(err.to_string())
}

/// Linear resampling, good enough for style conditioning
fn resample(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = from as f64 / to as f64;
    let out_len = ((samples.len() as f64) / ratio).floor().max(1.0) as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos.floor() as usize;
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx.min(samples.len() - 1)];
            let b = samples[(idx + 1).min(samples.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}

impl Synthesizer for OnnxSynthesizer {
    fn compute_style(&self, reference: &Path) -> Result<StyleEmbedding> {
        let audio = wav::read_mono(reference)?;
        if audio.samples.is_empty() {
            return Err(Error::InvalidAudioFormat(
                "reference audio contains no samples".to_string(),
            ));
        }
        let samples = resample(&audio.samples, audio.sample_rate, self.sample_rate);

        let input = Array2::from_shape_vec((1, samples.len()), samples)
            .map_err(|e| Error::inference(e.to_string()))?;

        let outputs = self
            .style_encoder
            .run(ort::inputs!["audio" => input.view()].map_err(model_error)?)
            .map_err(model_error)?;

        let style = outputs
            .get("style")
            .ok_or_else(|| Error::inference("style encoder produced no `style` output"))?
            .try_extract_tensor::<f32>()
            .map_err(model_error)?;

        Ok(StyleEmbedding::new(style.view().iter().copied().collect()))
    }

    fn synthesize(
        &self,
        text: &str,
        style: &StyleEmbedding,
        params: &SynthesisParams,
    ) -> Result<AudioSegment> {
        let token_ids: Vec<i64> = text.chars().map(|c| c as i64).collect();

        let tokens = Array2::from_shape_vec((1, token_ids.len()), token_ids)
            .map_err(|e| Error::inference(e.to_string()))?;
        let style_input = Array2::from_shape_vec((1, style.dim()), style.as_slice().to_vec())
            .map_err(|e| Error::inference(e.to_string()))?;
        let alpha = Array1::from_vec(vec![params.alpha]);
        let beta = Array1::from_vec(vec![params.beta]);
        let steps = Array1::from_vec(vec![params.diffusion_steps as i64]);
        let scale = Array1::from_vec(vec![params.embedding_scale]);

        let outputs = self
            .acoustic
            .run(
                ort::inputs![
                    "tokens" => tokens.view(),
                    "style" => style_input.view(),
                    "alpha" => alpha.view(),
                    "beta" => beta.view(),
                    "diffusion_steps" => steps.view(),
                    "embedding_scale" => scale.view(),
                ]
                .map_err(model_error)?,
            )
            .map_err(model_error)?;

        let audio = outputs
            .get("audio")
            .ok_or_else(|| Error::inference("acoustic model produced no `audio` output"))?
            .try_extract_tensor::<f32>()
            .map_err(model_error)?;

        Ok(AudioSegment::new(
            audio.view().iter().copied().collect(),
            self.sample_rate,
        ))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
