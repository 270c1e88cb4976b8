//! Transcription Result Models
//!
//! Wire-compatible with the transcription service's JSON: segments carry
//! `start`/`end`/`text` and, when the model emits them, per-word timings.

use serde::{Deserialize, Serialize};

use crate::captions::{interpolate_word_timings, WordTiming};
use crate::TimeSec;

// =============================================================================
// Segment Types
// =============================================================================

/// A word entry as returned by the transcription service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentWord {
    /// The word text
    pub text: String,
    /// Start time in seconds, clip-relative
    pub start: TimeSec,
    /// End time in seconds, clip-relative
    pub end: TimeSec,
}

/// One recognized speech unit inside a single clip's local timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds, clip-relative
    pub start: TimeSec,
    /// End time in seconds, clip-relative
    pub end: TimeSec,
    /// Recognized text
    pub text: String,
    /// Word-level timings when the service supplied them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<SegmentWord>>,
}

impl TranscriptSegment {
    /// Creates a segment without word timings
    pub fn new(start: TimeSec, end: TimeSec, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: None,
        }
    }

    /// Attaches service-supplied word timings
    pub fn with_words(mut self, words: Vec<SegmentWord>) -> Self {
        self.words = Some(words);
        self
    }

    /// Word timings for this segment: service-supplied timings are used
    /// unmodified; otherwise the segment duration is spread evenly across
    /// the whitespace-separated words of `text`.
    pub fn word_timings(&self) -> Vec<WordTiming> {
        match &self.words {
            Some(words) => words
                .iter()
                .map(|w| WordTiming::new(w.text.clone(), w.start, w.end))
                .collect(),
            None => interpolate_word_timings(&self.text, self.start, self.end),
        }
    }
}

// =============================================================================
// Clip Transcription
// =============================================================================

/// Transcription result for one clip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClipTranscription {
    /// All recognized segments, in time order
    pub segments: Vec<TranscriptSegment>,
}

impl ClipTranscription {
    /// Creates a transcription from segments
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    /// Flattens all segments to a single clip-relative word list
    pub fn flatten_words(&self) -> Vec<WordTiming> {
        self.segments.iter().flat_map(|s| s.word_timings()).collect()
    }

    /// Full recognized text of the clip
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// =============================================================================
// Tests
// =============================================================================
