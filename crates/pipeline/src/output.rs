//! Generated WAV files
//!
//! Every file is written as `audio_<YYYYmmddHHMMSS>_<uuid>.wav` in the output
//! directory and tracked until it is removed or purged.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use uuid::Uuid;
use voice_tts_core::{Result, SynthesisResult};

use crate::wav;

pub const OUTPUT_PREFIX: &str = "audio_";
pub const OUTPUT_SUFFIX: &str = ".wav";

/// A written output file
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAudioFile {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

pub struct OutputManager {
    dir: PathBuf,
    clamp: bool,
    registry: Mutex<Vec<GeneratedAudioFile>>,
}

impl OutputManager {
    pub fn new(dir: impl Into<PathBuf>, clamp: bool) -> Self {
        Self {
            dir: dir.into(),
            clamp,
            registry: Mutex::new(Vec::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the result as 16-bit mono PCM and track the file
    pub fn write(&self, result: &SynthesisResult) -> Result<GeneratedAudioFile> {
        let filename = generate_filename();
        let path = self.dir.join(&filename);
        let pcm = to_pcm16(&result.samples, self.clamp);

        wav::write_pcm16(&path, &pcm, result.sample_rate)?;

        let file = GeneratedAudioFile {
            filename,
            path,
            created_at: Utc::now(),
        };
        self.registry.lock().push(file.clone());

        tracing::debug!(
            file = %file.filename,
            samples = pcm.len(),
            sample_rate = result.sample_rate,
            "Wrote generated audio"
        );
        Ok(file)
    }

    /// Delete a generated file and stop tracking it. A file that is already
    /// gone is not an error.
    pub fn remove(&self, file: &GeneratedAudioFile) -> Result<()> {
        self.registry.lock().retain(|f| f.path != file.path);
        match std::fs::remove_file(&file.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot of tracked files, oldest first
    pub fn tracked(&self) -> Vec<GeneratedAudioFile> {
        self.registry.lock().clone()
    }

    /// Stop tracking everything, returning what was tracked
    pub fn untrack_all(&self) -> Vec<GeneratedAudioFile> {
        std::mem::take(&mut *self.registry.lock())
    }

    /// Stop tracking files created before `cutoff`, returning them
    pub fn untrack_older_than(&self, cutoff: DateTime<Utc>) -> Vec<GeneratedAudioFile> {
        let mut registry = self.registry.lock();
        let (expired, kept): (Vec<_>, Vec<_>) =
            registry.drain(..).partition(|f| f.created_at < cutoff);
        *registry = kept;
        expired
    }
}

/// `audio_<local timestamp>_<uuid>.wav`
fn generate_filename() -> String {
    format!(
        "{}{}_{}{}",
        OUTPUT_PREFIX,
        Local::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple(),
        OUTPUT_SUFFIX
    )
}

/// Whether a filename matches the cleanup pattern
pub fn is_generated_output(filename: &str) -> bool {
    filename.starts_with(OUTPUT_PREFIX) && filename.ends_with(OUTPUT_SUFFIX)
}

/// Scale `f32` samples to 16-bit PCM.
///
/// With `clamp` set, samples are limited to [-1, 1] first. Without it the
/// scaled value is truncated to an integer and wrapped to 16 bits, so
/// out-of-range input wraps around instead of saturating.
pub fn to_pcm16(samples: &[f32], clamp: bool) -> Vec<i16> {
    if clamp {
        samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
            .collect()
    } else {
        samples
            .iter()
            .map(|&s| (s * 32767.0) as i32 as i16)
            .collect()
    }
}
