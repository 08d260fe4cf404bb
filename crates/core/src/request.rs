//! Synthesis request types

/// Reference recording uploaded by the caller
#[derive(Debug, Clone)]
pub struct UploadedReference {
    /// Filename declared by the client
    pub filename: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl UploadedReference {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// An empty part carries no recording, whatever its declared name.
    /// Browsers send one when the file field is left blank.
    pub fn is_blank(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One text-to-speech request
#[derive(Debug, Clone, Default)]
pub struct SynthesisRequest {
    pub text: String,
    pub reference: Option<UploadedReference>,
    pub voice: Option<String>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_reference(mut self, reference: UploadedReference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Uploaded reference, ignoring blank form parts
    pub fn uploaded_reference(&self) -> Option<&UploadedReference> {
        self.reference.as_ref().filter(|r| !r.is_blank())
    }

    /// Requested voice id, ignoring blank values
    pub fn requested_voice(&self) -> Option<&str> {
        self.voice
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
