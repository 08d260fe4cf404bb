//! Voice catalog configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use voice_tts_core::{UnknownVoicePolicy, VoiceCatalog, VoiceCatalogEntry, VoiceId};

use crate::ConfigError;

/// Built-in catalog ids, each backed by `<dir>/<id>.wav`
pub const BUILTIN_VOICES: [&str; 8] = [
    "f-us-1", "f-us-2", "f-us-3", "f-us-4", "m-us-1", "m-us-2", "m-us-3", "m-us-4",
];

/// Voice catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicesConfig {
    /// Directory holding the reference recordings
    #[serde(default = "default_voices_dir")]
    pub dir: String,

    /// Voice used when the request names none
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Behaviour for voice ids missing from the catalog
    #[serde(default)]
    pub unknown_voice_policy: UnknownVoicePolicy,

    /// Catalog entries; relative paths resolve against `dir`
    #[serde(default = "default_entries")]
    pub entries: Vec<VoiceEntryConfig>,
}

/// A single catalog voice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceEntryConfig {
    pub id: String,
    pub path: String,
}

fn default_voices_dir() -> String {
    "voices".to_string()
}
fn default_voice() -> String {
    "m-us-4".to_string()
}
fn default_entries() -> Vec<VoiceEntryConfig> {
    BUILTIN_VOICES
        .iter()
        .map(|id| VoiceEntryConfig {
            id: id.to_string(),
            path: format!("{}.wav", id),
        })
        .collect()
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            dir: default_voices_dir(),
            default_voice: default_voice(),
            unknown_voice_policy: UnknownVoicePolicy::default(),
            entries: default_entries(),
        }
    }
}

impl VoicesConfig {
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.dir).join(path)
        }
    }

    /// Build the validated catalog
    pub fn catalog(&self) -> Result<VoiceCatalog, ConfigError> {
        let entries = self
            .entries
            .iter()
            .map(|entry| VoiceCatalogEntry {
                id: VoiceId::new(entry.id.trim()),
                reference_path: self.resolve_path(&entry.path),
            })
            .collect();

        VoiceCatalog::new(VoiceId::new(self.default_voice.trim()), entries)
            .map_err(|e| ConfigError::invalid("voices", e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entries.is_empty() {
            return Err(ConfigError::invalid("voices.entries", "catalog is empty"));
        }
        let catalog = self.catalog()?;

        // Warn only, recordings may be provisioned after the config is written
        for entry in catalog.entries() {
            if !entry.reference_path.is_file() {
                tracing::warn!(
                    voice = %entry.id,
                    path = %entry.reference_path.display(),
                    "Voice reference recording not found"
                );
            }
        }
        Ok(())
    }
}
