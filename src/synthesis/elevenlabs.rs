//! ElevenLabs Synthesizer
//!
//! Implements [`SpeechSynthesizer`] against the ElevenLabs text-to-speech
//! API.

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use super::SpeechSynthesizer;
use crate::{PipelineError, PipelineResult};

// =============================================================================
// Constants
// =============================================================================

/// Default ElevenLabs API base URL
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default model
const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Output encoding requested from the provider
const OUTPUT_FORMAT: &str = "mp3_44100_64";

/// Voice stability setting
const STABILITY: f32 = 0.5;

/// Voice similarity boost setting
const SIMILARITY_BOOST: f32 = 0.75;

// =============================================================================
// API Types
// =============================================================================

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    model_id: &'a str,
    text: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

// =============================================================================
// ElevenLabs Synthesizer
// =============================================================================

/// Text-to-speech client for the ElevenLabs API
pub struct ElevenLabsSynthesizer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model_id: String,
}

impl ElevenLabsSynthesizer {
    /// Creates a new synthesizer
    pub fn new(api_key: impl Into<String>) -> PipelineResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(PipelineError::Synthesis(
                "ElevenLabs API key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| {
                PipelineError::Synthesis(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
        })
    }

    /// Sets a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the model
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    fn synthesis_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.base_url, voice_id, OUTPUT_FORMAT
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        out_path: &Path,
    ) -> PipelineResult<()> {
        let request = SynthesisRequest {
            model_id: &self.model_id,
            text,
            voice_settings: VoiceSettings {
                stability: STABILITY,
                similarity_boost: SIMILARITY_BOOST,
            },
        };

        debug!("synthesizing {} chars with voice {}", text.len(), voice_id);
        let response = self
            .client
            .post(self.synthesis_url(voice_id))
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Synthesis(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable response body>".to_string());
            let truncated: String = body.chars().take(500).collect();
            return Err(PipelineError::Synthesis(format!(
                "Provider responded with status {}: {}",
                status, truncated
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Synthesis(format!("Failed to read audio: {}", e)))?;

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tokio::fs::write(out_path, &audio).await?;

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
