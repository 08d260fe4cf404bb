//! End-to-end tests through `SpeechService::from_settings`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use voice_tts_config::{OutputRetention, Settings, BUILTIN_VOICES};
use voice_tts_core::{
    AudioSegment, Error, Result, StyleEmbedding, StyleSource, SynthesisParams, SynthesisRequest,
    Synthesizer, UploadedReference, VoiceId,
};
use voice_tts_pipeline::output::to_pcm16;
use voice_tts_pipeline::wav::write_pcm16;
use voice_tts_pipeline::{CleanupService, SimpleSynthesizer, SpeechService};

/// Engine whose audio encodes the chunk text, and whose style encodes the
/// reference file bytes
#[derive(Default)]
struct EchoEngine {
    chunks: Mutex<Vec<String>>,
    references: Mutex<Vec<(PathBuf, bool)>>,
}

impl EchoEngine {
    fn tag(text: &str) -> Vec<f32> {
        text.bytes().map(|b| b as f32 / 255.0).collect()
    }
}

impl Synthesizer for EchoEngine {
    fn compute_style(&self, reference: &Path) -> Result<StyleEmbedding> {
        self.references
            .lock()
            .push((reference.to_path_buf(), reference.exists()));
        let bytes = std::fs::read(reference)?;
        Ok(StyleEmbedding::new(vec![
            bytes.len() as f32,
            bytes.iter().map(|&b| b as f32).sum(),
        ]))
    }

    fn synthesize(&self, text: &str, _style: &StyleEmbedding, _params: &SynthesisParams) -> Result<AudioSegment> {
        self.chunks.lock().push(text.to_string());
        Ok(AudioSegment::new(Self::tag(text), 24_000))
    }

    fn sample_rate(&self) -> u32 {
        24_000
    }
}

struct Env {
    settings: Settings,
    root: tempfile::TempDir,
}

impl Env {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let voices = root.path().join("voices");
        std::fs::create_dir_all(&voices).unwrap();
        for (i, id) in BUILTIN_VOICES.iter().enumerate() {
            write_tone(&voices.join(format!("{}.wav", id)), 120.0 + 40.0 * i as f32);
        }

        let mut settings = Settings::default();
        settings.voices.dir = voices.to_string_lossy().into_owned();
        settings.output.dir = root.path().join("out").to_string_lossy().into_owned();
        settings.output.scratch_dir = Some(root.path().join("scratch").to_string_lossy().into_owned());
        Self { settings, root }
    }

    fn scratch(&self) -> PathBuf {
        self.root.path().join("scratch")
    }

    fn out(&self) -> PathBuf {
        self.root.path().join("out")
    }
}

fn write_tone(path: &Path, freq: f32) {
    let samples: Vec<i16> = (0..2_400)
        .map(|i| {
            let t = i as f32 / 24_000.0;
            ((2.0 * std::f32::consts::PI * freq * t).sin() * 8_000.0) as i16
        })
        .collect();
    write_pcm16(path, &samples, 24_000).unwrap();
}

fn read_samples(bytes: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    let samples = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

#[test]
fn test_hello_world_default_voice() {
    let env = Env::new();
    let service = SpeechService::from_settings(&env.settings, Arc::new(SimpleSynthesizer::new(24_000))).unwrap();

    let rendered = service.render(&SynthesisRequest::new("Hello world.")).unwrap();

    assert_eq!(rendered.source, StyleSource::Default(VoiceId::new("m-us-4")));
    assert_eq!(rendered.sample_rate, 24_000);
    assert!(rendered.duration_secs > 0.0);

    let (spec, samples) = read_samples(&rendered.bytes);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 24_000);
    assert_eq!(spec.bits_per_sample, 16);
    assert!(!samples.is_empty());

    assert!(rendered.file.filename.starts_with("audio_"));
    assert!(rendered.file.path.starts_with(env.out()));
}

#[test]
fn test_multi_chunk_order() {
    let mut env = Env::new();
    env.settings.synthesis.segmenter.desired_length = 10;
    env.settings.synthesis.segmenter.max_length = 40;
    let engine = Arc::new(EchoEngine::default());
    let service = SpeechService::from_settings(&env.settings, engine.clone()).unwrap();

    let rendered = service
        .render(&SynthesisRequest::new("First sentence here. Second one."))
        .unwrap();

    assert_eq!(*engine.chunks.lock(), vec!["First sentence here.", "Second one."]);

    let first = EchoEngine::tag("First sentence here.");
    let second = EchoEngine::tag("Second one.");
    let in_order: Vec<f32> = first.iter().chain(second.iter()).copied().collect();
    let (_, samples) = read_samples(&rendered.bytes);
    assert_eq!(samples, to_pcm16(&in_order, true));
}

#[test]
fn test_catalog_styles_computed_once_at_startup() {
    let env = Env::new();
    let engine = Arc::new(EchoEngine::default());
    let service = SpeechService::from_settings(&env.settings, engine.clone()).unwrap();
    assert_eq!(engine.references.lock().len(), BUILTIN_VOICES.len());

    for voice in ["f-us-1", "m-us-2", "m-us-4"] {
        let rendered = service
            .render(&SynthesisRequest::new("Hi there.").with_voice(voice))
            .unwrap();
        assert_eq!(rendered.source, StyleSource::Catalog(VoiceId::new(voice)));
    }
    assert_eq!(engine.references.lock().len(), BUILTIN_VOICES.len());
}

#[test]
fn test_upload_temp_file_removed() {
    let env = Env::new();
    let engine = Arc::new(EchoEngine::default());
    let service = SpeechService::from_settings(&env.settings, engine.clone()).unwrap();
    let catalog_calls = engine.references.lock().len();

    let request = SynthesisRequest::new("Clone my voice.")
        .with_reference(UploadedReference::new("me.wav", b"RIFF not really a wav".to_vec()))
        .with_voice("f-us-1");
    let rendered = service.render(&request).unwrap();
    assert_eq!(rendered.source, StyleSource::Uploaded);

    let references = engine.references.lock();
    let (path, existed) = &references[catalog_calls];
    assert!(*existed);
    assert!(path.starts_with(env.scratch()));
    assert!(!path.exists());
    assert!(dir_is_empty(&env.scratch()));
}

#[test]
fn test_upload_must_be_wav() {
    let env = Env::new();
    let service = SpeechService::from_settings(&env.settings, Arc::new(SimpleSynthesizer::new(24_000))).unwrap();

    let request = SynthesisRequest::new("Hello.")
        .with_reference(UploadedReference::new("me.mp3", b"ID3".to_vec()));
    assert!(matches!(service.render(&request), Err(Error::InvalidAudioFormat(_))));
    assert!(dir_is_empty(&env.scratch()));
}

#[test]
fn test_same_request_same_audio() {
    let env = Env::new();
    let service = SpeechService::from_settings(&env.settings, Arc::new(SimpleSynthesizer::new(24_000))).unwrap();

    let mut upload_bytes = Vec::new();
    {
        let path = env.root.path().join("upload.wav");
        write_tone(&path, 333.0);
        upload_bytes.extend(std::fs::read(&path).unwrap());
    }
    let request = SynthesisRequest::new("The same words, twice.")
        .with_reference(UploadedReference::new("upload.wav", upload_bytes));

    let first = service.render(&request).unwrap();
    let second = service.render(&request).unwrap();
    assert_ne!(first.file.filename, second.file.filename);
    assert_eq!(first.bytes, second.bytes);
}

#[test]
fn test_unknown_voice_rejected_by_default() {
    let env = Env::new();
    let service = SpeechService::from_settings(&env.settings, Arc::new(SimpleSynthesizer::new(24_000))).unwrap();
    let err = service
        .render(&SynthesisRequest::new("Hello.").with_voice("x-zz-9"))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownVoice(_)));
}

#[test]
fn test_missing_catalog_recording_fails_startup() {
    let env = Env::new();
    std::fs::remove_file(Path::new(&env.settings.voices.dir).join("f-us-2.wav")).unwrap();
    assert!(SpeechService::from_settings(&env.settings, Arc::new(SimpleSynthesizer::new(24_000))).is_err());
}

#[test]
fn test_purge_after_requests() {
    let mut env = Env::new();
    env.settings.output.retention = OutputRetention::UntilShutdown;
    let service = SpeechService::from_settings(&env.settings, Arc::new(SimpleSynthesizer::new(24_000))).unwrap();

    for text in ["One.", "Two.", "Three."] {
        service.render(&SynthesisRequest::new(text)).unwrap();
    }
    assert_eq!(std::fs::read_dir(env.out()).unwrap().count(), 3);

    let report = CleanupService::new(service.output().clone()).purge().unwrap();
    assert_eq!(report.removed, 3);
    assert!(dir_is_empty(&env.out()));
}
