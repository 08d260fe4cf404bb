//! Voice catalog types

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Catalog voice identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceId(String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for VoiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A predefined voice backed by a reference recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCatalogEntry {
    pub id: VoiceId,
    pub reference_path: PathBuf,
}

/// Fixed set of voices established at startup
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    default_voice: VoiceId,
    entries: Vec<VoiceCatalogEntry>,
}

impl VoiceCatalog {
    /// Build a catalog; ids must be unique and the default must be one of them
    pub fn new(default_voice: VoiceId, entries: Vec<VoiceCatalogEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(Error::config(format!("duplicate voice id in catalog: {}", entry.id)));
            }
        }

        if !seen.contains(default_voice.as_str()) {
            return Err(Error::config(format!(
                "default voice '{}' is not in the catalog",
                default_voice
            )));
        }

        Ok(Self { default_voice, entries })
    }

    pub fn default_voice(&self) -> &VoiceId {
        &self.default_voice
    }

    pub fn entries(&self) -> &[VoiceCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What to do when a request names a voice that is not in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownVoicePolicy {
    /// Fail the request with `UnknownVoice`
    #[default]
    Reject,
    /// Log a warning and use the default voice
    FallbackToDefault,
}
