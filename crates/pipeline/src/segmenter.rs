//! Sentence-packing text segmentation
//!
//! Splits request text into chunks short enough for the acoustic model while
//! keeping sentences together where possible.

use std::str::SplitWhitespace;

use voice_tts_config::SegmenterConfig;
use voice_tts_core::Segmenter;

/// Default segmenter
#[derive(Debug, Clone)]
pub struct TextSegmenter {
    desired_length: usize,
    max_length: usize,
}

impl TextSegmenter {
    pub fn new(config: &SegmenterConfig) -> Self {
        Self {
            desired_length: config.desired_length,
            max_length: config.max_length.max(1),
        }
    }

    /// Iterate chunks of `text`
    pub fn segments<'a>(&self, text: &'a str) -> Segments<'a> {
        Segments {
            words: text.split_whitespace(),
            pending: None,
            desired_length: self.desired_length,
            max_length: self.max_length,
        }
    }
}

impl Default for TextSegmenter {
    fn default() -> Self {
        Self::new(&SegmenterConfig::default())
    }
}

impl Segmenter for TextSegmenter {
    fn segment<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        Box::new(self.segments(text))
    }
}

/// Lazy chunk iterator over borrowed text
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    words: SplitWhitespace<'a>,
    /// Word that did not fit in the previous chunk
    pending: Option<&'a str>,
    desired_length: usize,
    max_length: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut chunk = String::new();
        let mut chars = 0usize;

        while let Some(word) = self.pending.take().or_else(|| self.words.next()) {
            let word_chars = word.chars().count();

            if chars > 0 && chars + 1 + word_chars > self.max_length {
                self.pending = Some(word);
                break;
            }

            if chars > 0 {
                chunk.push(' ');
                chars += 1;
            }
            chunk.push_str(word);
            chars += word_chars;

            if chars >= self.desired_length && is_sentence_end(word) {
                break;
            }
        }

        (!chunk.is_empty()).then_some(chunk)
    }
}

/// Check if word ends a sentence, allowing trailing quotes or brackets
fn is_sentence_end(word: &str) -> bool {
    word.trim_end_matches(['"', '\'', ')', ']', '\u{201d}', '\u{2019}'])
        .ends_with(['.', '!', '?', '\u{2026}'])
}
