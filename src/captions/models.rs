//! Caption Data Models

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ClipIndex, PipelineResult, TimeSec};

// =============================================================================
// Word Timing
// =============================================================================

/// Timing for a single displayed word
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTiming {
    /// The word text
    pub word: String,
    /// Start time in seconds
    pub start_sec: TimeSec,
    /// End time in seconds
    pub end_sec: TimeSec,
}

impl WordTiming {
    /// Creates a new word timing
    pub fn new(word: impl Into<String>, start_sec: TimeSec, end_sec: TimeSec) -> Self {
        Self {
            word: word.into(),
            start_sec,
            end_sec,
        }
    }
}

/// Distributes a time range evenly across the whitespace-separated words of
/// `text`.
///
/// Word *i* of *n* gets `[start + i*d, start + (i+1)*d]` with
/// `d = (end-start)/n`. Empty text produces an empty list. This is the
/// deterministic fallback for segments without service-supplied timings; it
/// must not replace real timings when they exist.
pub fn interpolate_word_timings(
    text: &str,
    start_sec: TimeSec,
    end_sec: TimeSec,
) -> Vec<WordTiming> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let per_word = (end_sec - start_sec) / words.len() as f64;
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            WordTiming::new(
                *word,
                start_sec + i as f64 * per_word,
                start_sec + (i + 1) as f64 * per_word,
            )
        })
        .collect()
}

// =============================================================================
// Caption Block
// =============================================================================

/// One timestamped unit of subtitle text on the global timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionBlock {
    /// 1-based block index within its caption file
    pub index: u32,
    /// Start time in seconds (global timeline)
    pub start_sec: TimeSec,
    /// End time in seconds (global timeline)
    pub end_sec: TimeSec,
    /// Display text
    pub text: String,
    /// The raw SRT block this entry was built from
    pub raw_block: String,
    /// Which clip's caption file this block came from; maps the block back
    /// to speaker and overlay data downstream
    pub source_file_index: ClipIndex,
    /// Per-word timings covering `text`
    pub words: Vec<WordTiming>,
}

impl CaptionBlock {
    /// Returns the display duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    /// Returns true if the block is visible at the given time
    pub fn is_visible_at(&self, time_sec: TimeSec) -> bool {
        time_sec >= self.start_sec && time_sec < self.end_sec
    }
}

// =============================================================================
// Caption File
// =============================================================================

/// Serialized caption blocks for one clip
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionFile {
    /// File name (audio file name with the extension replaced by `.srt`)
    pub file_name: String,
    /// Full SRT content
    pub content: String,
}

impl CaptionFile {
    /// Creates a new caption file
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Writes the content under `dir`, returning the full path
    pub fn write_to(&self, dir: &Path) -> PipelineResult<std::path::PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }
}

// =============================================================================
// Tests
// =============================================================================
