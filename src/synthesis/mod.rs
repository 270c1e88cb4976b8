//! Speech Synthesis
//!
//! Interface boundary to the text-to-speech collaborator: one audio
//! artifact per dialogue line at a deterministic
//! `{speakerId}-{clipIndex}.mp3` path.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::{ClipRef, DialogueEntry, PipelineError, PipelineResult};

mod elevenlabs;
pub use elevenlabs::*;

// =============================================================================
// Synthesizer Trait
// =============================================================================

/// Trait for text-to-speech providers
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesizes `text` with the given voice, writing the audio artifact
    /// to `out_path`
    async fn synthesize(&self, voice_id: &str, text: &str, out_path: &Path)
        -> PipelineResult<()>;
}

// =============================================================================
// Voice Map
// =============================================================================

/// Maps speaker identifiers to provider voice ids
#[derive(Clone, Debug)]
pub struct VoiceMap {
    voices: HashMap<String, String>,
    default_voice: String,
}

impl VoiceMap {
    /// Creates a voice map with a fallback voice for unknown speakers
    pub fn new(default_voice: impl Into<String>) -> Self {
        Self {
            voices: HashMap::new(),
            default_voice: default_voice.into(),
        }
    }

    /// Registers a voice for a speaker
    pub fn with_voice(mut self, speaker_id: impl Into<String>, voice_id: impl Into<String>) -> Self {
        self.voices.insert(speaker_id.into(), voice_id.into());
        self
    }

    /// Returns the voice for a speaker, falling back to the default
    pub fn voice_for(&self, speaker_id: &str) -> &str {
        self.voices
            .get(speaker_id)
            .map(String::as_str)
            .unwrap_or(&self.default_voice)
    }
}

// =============================================================================
// Dialogue Synthesis
// =============================================================================

/// Synthesizes every dialogue line in order, producing one [`ClipRef`] per
/// line at `{speaker_id}-{index}.mp3` under `out_dir`. A synthesis failure
/// aborts the run.
pub async fn synthesize_dialogue(
    synthesizer: &dyn SpeechSynthesizer,
    voices: &VoiceMap,
    entries: &[DialogueEntry],
    out_dir: &Path,
) -> PipelineResult<Vec<ClipRef>> {
    std::fs::create_dir_all(out_dir)?;

    let mut clips = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let file_name = format!("{}-{}.mp3", entry.speaker_id, index);
        let out_path = out_dir.join(&file_name);

        info!("synthesizing clip {}/{}: {}", index + 1, entries.len(), file_name);
        synthesizer
            .synthesize(voices.voice_for(&entry.speaker_id), &entry.text, &out_path)
            .await?;

        let mut clip = ClipRef::new(
            entry.speaker_id.clone(),
            out_path.to_string_lossy().to_string(),
            index,
        );
        if let Some(tweet_ref) = &entry.tweet_ref {
            clip = clip.with_tweet_ref(tweet_ref.clone());
        }
        clips.push(clip);
    }

    Ok(clips)
}

// =============================================================================
// Mock Synthesizer (for testing)
// =============================================================================

/// Mock synthesizer that writes placeholder artifacts and records calls
pub struct MockSpeechSynthesizer {
    available: bool,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockSpeechSynthesizer {
    /// Creates a new mock
    pub fn new() -> Self {
        Self {
            available: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Sets availability
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Returns the `(voice_id, text)` pairs received so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockSpeechSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeechSynthesizer {
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        out_path: &Path,
    ) -> PipelineResult<()> {
        if !self.available {
            return Err(PipelineError::Synthesis(
                "mock synthesis failure".to_string(),
            ));
        }

        if let Ok(mut calls) = self.calls.lock() {
            calls.push((voice_id.to_string(), text.to_string()));
        }
        std::fs::write(out_path, b"")?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
