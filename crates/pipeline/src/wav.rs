//! WAV container helpers (hound)

use std::io;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use voice_tts_core::{Error, Result};

/// Decoded mono audio
#[derive(Debug, Clone)]
pub struct MonoAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Read a WAV file as mono `f32` samples in [-1, 1], averaging channels
pub fn read_mono(path: &Path) -> Result<MonoAudio> {
    let reader = WavReader::open(path).map_err(decode_error)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(decode_error)?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1) as u32)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(decode_error)?
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(MonoAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Write 16-bit mono PCM
pub fn write_pcm16(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(encode_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(encode_error)?;
    }
    writer.finalize().map_err(encode_error)?;
    Ok(())
}

/// Unreadable container contents are the caller's problem, not an I/O fault
fn decode_error(err: hound::Error) -> Error {
    match err {
        hound::Error::IoError(e) if e.kind() != io::ErrorKind::UnexpectedEof => Error::Io(e),
        other => Error::InvalidAudioFormat(format!("cannot decode WAV audio: {}", other)),
    }
}

fn encode_error(err: hound::Error) -> Error {
    match err {
        hound::Error::IoError(e) => Error::Io(e),
        other => Error::Io(io::Error::other(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_pcm16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_pcm16(&path, &[0, 16384, -16384, 32767], 24_000).unwrap();

        let audio = read_mono(&path).unwrap();
        assert_eq!(audio.sample_rate, 24_000);
        assert_eq!(audio.samples.len(), 4);
        assert!((audio.samples[1] - 0.5).abs() < 1e-4);
        assert!((audio.samples[2] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_stereo_downmix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for sample in [1.0f32, 0.0, 0.5, 0.5] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let audio = read_mono(&path).unwrap();
        assert_eq!(audio.samples, vec![0.5, 0.5]);
    }

    #[test]
    fn test_garbage_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        std::fs::write(&path, b"definitely not a riff file").unwrap();
        assert!(matches!(read_mono(&path), Err(Error::InvalidAudioFormat(_))));
    }

    #[test]
    fn test_truncated_header_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        std::fs::write(&path, b"RIFF").unwrap();
        assert!(matches!(read_mono(&path), Err(Error::InvalidAudioFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(read_mono(&dir.path().join("nope.wav")), Err(Error::Io(_))));
    }
}
