//! Test doubles shared by the unit tests

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use voice_tts_core::{
    AudioSegment, Error, Result, Segmenter, StyleEmbedding, SynthesisParams, Synthesizer,
};

/// Write a mono 16-bit sine tone
pub fn write_tone(path: &Path, freq: f32, sample_rate: u32, seconds: f32) {
    let count = (sample_rate as f32 * seconds) as usize;
    let samples: Vec<i16> = (0..count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            ((2.0 * std::f32::consts::PI * freq * t).sin() * 0.5 * i16::MAX as f32) as i16
        })
        .collect();
    crate::wav::write_pcm16(path, &samples, sample_rate).unwrap();
}

/// Reference file seen by the engine during style extraction
#[derive(Debug, Clone)]
pub struct SeenReference {
    pub path: PathBuf,
    pub existed: bool,
}

/// Engine whose output identifies the chunk it was given.
///
/// Each segment's samples are the chunk's bytes scaled to [0, 1], so any
/// reordering of segments changes the concatenated buffer.
pub struct TaggingSynthesizer {
    sample_rate: u32,
    fail_style: AtomicBool,
    fail_synthesis: AtomicBool,
    pub chunks: Mutex<Vec<String>>,
    pub styles: Mutex<Vec<StyleEmbedding>>,
    pub references: Mutex<Vec<SeenReference>>,
}

impl TaggingSynthesizer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            fail_style: AtomicBool::new(false),
            fail_synthesis: AtomicBool::new(false),
            chunks: Mutex::new(Vec::new()),
            styles: Mutex::new(Vec::new()),
            references: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_style(self) -> Self {
        self.fail_style.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_synthesis(self) -> Self {
        self.fail_synthesis.store(true, Ordering::SeqCst);
        self
    }

    pub fn tag(text: &str) -> Vec<f32> {
        text.bytes().map(|b| b as f32 / 255.0).collect()
    }

    pub fn style_for(bytes: &[u8]) -> StyleEmbedding {
        StyleEmbedding::new(vec![bytes.len() as f32, bytes.iter().map(|&b| b as f32).sum()])
    }
}

impl Synthesizer for TaggingSynthesizer {
    fn compute_style(&self, reference: &Path) -> Result<StyleEmbedding> {
        self.references.lock().push(SeenReference {
            path: reference.to_path_buf(),
            existed: reference.exists(),
        });
        if self.fail_style.load(Ordering::SeqCst) {
            return Err(Error::inference("style extraction failed"));
        }
        let bytes = std::fs::read(reference)?;
        Ok(Self::style_for(&bytes))
    }

    fn synthesize(
        &self,
        text: &str,
        style: &StyleEmbedding,
        _params: &SynthesisParams,
    ) -> Result<AudioSegment> {
        if self.fail_synthesis.load(Ordering::SeqCst) {
            return Err(Error::inference("synthesis failed"));
        }
        self.chunks.lock().push(text.to_string());
        self.styles.lock().push(style.clone());
        Ok(AudioSegment::new(Self::tag(text), self.sample_rate))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Non-reentrant engine that records how many calls overlapped
pub struct ConcurrencyTracker {
    sample_rate: u32,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl ConcurrencyTracker {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(1));
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Synthesizer for ConcurrencyTracker {
    fn compute_style(&self, _reference: &Path) -> Result<StyleEmbedding> {
        self.enter();
        Ok(StyleEmbedding::new(vec![0.0; 4]))
    }

    fn synthesize(
        &self,
        _text: &str,
        _style: &StyleEmbedding,
        _params: &SynthesisParams,
    ) -> Result<AudioSegment> {
        self.enter();
        Ok(AudioSegment::new(vec![0.0; 8], self.sample_rate))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Segmenter that splits on `|`
pub struct PipeSegmenter;

impl Segmenter for PipeSegmenter {
    fn segment<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(
            text.split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        )
    }
}
