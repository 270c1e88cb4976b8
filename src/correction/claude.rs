//! Claude Correction Service
//!
//! Implements [`CorrectionService`] against the Anthropic Messages API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::CorrectionService;
use crate::{PipelineError, PipelineResult};

// =============================================================================
// Constants
// =============================================================================

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header
const API_VERSION: &str = "2023-06-01";

/// Default model
const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20251015";

/// Corrected SRT files can be long; leave generous headroom
const MAX_TOKENS: u32 = 8192;

/// Instruction sent with every correction request. The service must return
/// the SRT text and nothing else because the response is written to disk
/// verbatim.
const CORRECTION_INSTRUCTION: &str = "The first item below is the correct dialogue text; the second is the SRT file generated from it, which is not totally accurate. Sometimes the SRT is missing words entirely; add any words present in the dialogue text. Using the accurate dialogue text, return the SRT text corrected for inaccurate spelling and misheard words. Keep the format and the times exactly the same.\n\nnote: ONLY RETURN THE SRT FILE TEXT, NOTHING ELSE, NO COMMENTS, NO EXPLANATIONS, because the output is used directly as a file.";

// =============================================================================
// API Types
// =============================================================================

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

// =============================================================================
// Claude Correction Service
// =============================================================================

/// Caption corrector backed by Claude
pub struct ClaudeCorrectionService {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ClaudeCorrectionService {
    /// Creates a new corrector
    pub fn new(api_key: impl Into<String>) -> PipelineResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(PipelineError::CorrectionService(
                "Anthropic API key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                PipelineError::CorrectionService(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Sets a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn build_prompt(dialogue_text: &str, srt_text: &str) -> String {
        format!(
            "{}\n\ntranscript:\n{}\n\nsrt file text:\n{}",
            CORRECTION_INSTRUCTION, dialogue_text, srt_text
        )
    }
}

#[async_trait]
impl CorrectionService for ClaudeCorrectionService {
    async fn correct(&self, dialogue_text: &str, srt_text: &str) -> PipelineResult<String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: Self::build_prompt(dialogue_text, srt_text),
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);
        debug!("requesting caption correction from {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::CorrectionService(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PipelineError::CorrectionService(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiError>(&body) {
                return Err(PipelineError::CorrectionService(format!(
                    "Anthropic API error ({}): {} - {}",
                    status, error.error.error_type, error.error.message
                )));
            }
            let truncated: String = body.chars().take(500).collect();
            return Err(PipelineError::CorrectionService(format!(
                "Anthropic API error ({}): {}",
                status, truncated
            )));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body).map_err(|e| {
            PipelineError::CorrectionService(format!("Failed to parse response: {}", e))
        })?;

        let text = parsed
            .content
            .iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    block.text.clone()
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(PipelineError::CorrectionService(
                "Empty correction response".to_string(),
            ));
        }

        Ok(text)
    }
}

// =============================================================================
// Tests
// =============================================================================
