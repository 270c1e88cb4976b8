//! Subweave Core Type Definitions
//!
//! Defines fundamental types shared across the pipeline.

use serde::{Deserialize, Serialize};

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Position of a clip within the playback sequence
pub type ClipIndex = usize;

// =============================================================================
// Dialogue Types
// =============================================================================

/// One line of dialogue assigned to a synthesized clip.
///
/// Produced upstream by the dialogue generator; immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueEntry {
    /// Speaker identifier (voice lookup key)
    pub speaker_id: String,
    /// Ground-truth line text
    pub text: String,
    /// Optional social-post reference attached to this line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_ref: Option<String>,
}

impl DialogueEntry {
    /// Creates a new dialogue entry
    pub fn new(speaker_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            text: text.into(),
            tweet_ref: None,
        }
    }

    /// Attaches a tweet reference
    pub fn with_tweet_ref(mut self, tweet_ref: impl Into<String>) -> Self {
        self.tweet_ref = Some(tweet_ref.into());
        self
    }
}

// =============================================================================
// Clip Types
// =============================================================================

/// One synthesized audio artifact.
///
/// `sequence_index` defines playback order and is the join key back to the
/// [`DialogueEntry`] the clip was synthesized from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRef {
    /// Speaker identifier
    pub speaker_id: String,
    /// Path to the synthesized audio file
    pub file_path: String,
    /// Playback order position
    pub sequence_index: ClipIndex,
    /// Optional social-post reference carried over from the dialogue line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_ref: Option<String>,
}

impl ClipRef {
    /// Creates a new clip reference
    pub fn new(
        speaker_id: impl Into<String>,
        file_path: impl Into<String>,
        sequence_index: ClipIndex,
    ) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            file_path: file_path.into(),
            sequence_index,
            tweet_ref: None,
        }
    }

    /// Attaches a tweet reference
    pub fn with_tweet_ref(mut self, tweet_ref: impl Into<String>) -> Self {
        self.tweet_ref = Some(tweet_ref.into());
        self
    }

    /// Caption file name for this clip: the audio file name with its
    /// extension replaced by `.srt`
    pub fn caption_file_name(&self) -> String {
        let name = std::path::Path::new(&self.file_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_path.clone());

        match name.rsplit_once('.') {
            Some((stem, _ext)) => format!("{}.srt", stem),
            None => format!("{}.srt", name),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
