//! Reclaiming generated output files
//!
//! `purge` runs at shutdown and deletes every `audio_*.wav` in the output
//! directory. The optional sweep task deletes tracked files by age.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use voice_tts_core::Result;

use crate::output::{is_generated_output, OutputManager};

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
}

pub struct CleanupService {
    output: Arc<OutputManager>,
}

impl CleanupService {
    pub fn new(output: Arc<OutputManager>) -> Self {
        Self { output }
    }

    /// Delete every generated file in the output directory
    pub fn purge(&self) -> Result<CleanupReport> {
        let dir = self.output.dir();
        let mut report = CleanupReport::default();

        self.output.untrack_all();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !is_generated_output(name) || !entry.file_type()?.is_file() {
                continue;
            }

            match std::fs::remove_file(entry.path()) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "Failed to delete generated audio");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            removed = report.removed,
            failed = report.failed,
            "Purged generated audio"
        );
        Ok(report)
    }

    /// Delete tracked files older than `max_age`
    pub fn sweep_expired(&self, max_age: Duration) -> CleanupReport {
        let mut report = CleanupReport::default();
        let cutoff = match chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().checked_sub_signed(age))
        {
            Some(cutoff) => cutoff,
            // Older than anything representable
            None => return report,
        };

        for file in self.output.untrack_older_than(cutoff) {
            match std::fs::remove_file(&file.path) {
                Ok(()) => report.removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(file = %file.filename, error = %e, "Failed to delete expired audio");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Run `sweep_expired` every `interval` until `true` is sent on the
    /// returned channel
    pub fn start_sweep_task(self: &Arc<Self>, interval: Duration, max_age: Duration) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let service = Arc::clone(self);

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let report = service.sweep_expired(max_age);
                        if report.removed > 0 || report.failed > 0 {
                            tracing::info!(
                                removed = report.removed,
                                failed = report.failed,
                                remaining = service.output.tracked().len(),
                                "Output sweep"
                            );
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::info!("Output sweep task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_tts_core::SynthesisResult;

    fn write_outputs(output: &OutputManager, count: usize) {
        for _ in 0..count {
            output
                .write(&SynthesisResult {
                    sample_rate: 24_000,
                    samples: vec![0.0; 8],
                })
                .unwrap();
        }
    }

    #[test]
    fn test_purge_deletes_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = Arc::new(OutputManager::new(dir.path(), true));
        write_outputs(&output, 3);

        // Untracked leftovers from an earlier run match too
        std::fs::write(dir.path().join("audio_20240101000000.wav"), b"old").unwrap();
        std::fs::write(dir.path().join("audio_notes.txt"), b"keep").unwrap();
        std::fs::write(dir.path().join("voice.wav"), b"keep").unwrap();
        std::fs::create_dir(dir.path().join("audio_dir.wav")).unwrap();

        let cleanup = CleanupService::new(output.clone());
        let report = cleanup.purge().unwrap();

        assert_eq!(report, CleanupReport { removed: 4, failed: 0 });
        assert!(output.tracked().is_empty());

        let mut left: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left, vec!["audio_dir.wav", "audio_notes.txt", "voice.wav"]);
    }

    #[test]
    fn test_purge_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = Arc::new(OutputManager::new(dir.path().join("gone"), true));
        let report = CleanupService::new(output).purge().unwrap();
        assert_eq!(report, CleanupReport::default());
    }

    #[test]
    fn test_sweep_respects_age() {
        let dir = tempfile::tempdir().unwrap();
        let output = Arc::new(OutputManager::new(dir.path(), true));
        write_outputs(&output, 2);
        let cleanup = CleanupService::new(output.clone());

        let report = cleanup.sweep_expired(Duration::from_secs(3600));
        assert_eq!(report.removed, 0);
        assert_eq!(output.tracked().len(), 2);

        std::thread::sleep(Duration::from_millis(20));
        let report = cleanup.sweep_expired(Duration::from_millis(1));
        assert_eq!(report.removed, 2);
        assert!(output.tracked().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_sweep_task_runs_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let output = Arc::new(OutputManager::new(dir.path(), true));
        write_outputs(&output, 2);
        let cleanup = Arc::new(CleanupService::new(output.clone()));

        tokio::time::sleep(Duration::from_millis(20)).await;
        let shutdown = cleanup.start_sweep_task(Duration::from_millis(10), Duration::from_millis(1));

        for _ in 0..100 {
            if output.tracked().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(output.tracked().is_empty());

        shutdown.send(true).unwrap();
    }
}
