//! Transcription Client
//!
//! HTTP client for the batch speech-to-text service. The whole batch either
//! succeeds or fails: any network error, non-success status, or structural
//! mismatch in the response is retried on a fixed schedule, and exhaustion
//! surfaces as a fatal [`PipelineError::TranscriptionService`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{ClipTranscription, TranscriptSegment};
use crate::config::TRANSCRIPTION_RETRY_SCHEDULE;
use crate::{PipelineError, PipelineResult};

// =============================================================================
// Constants
// =============================================================================

/// Default base URL for the transcription service
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5005";

/// Request timeout; batch transcription of several clips is slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

// =============================================================================
// Service Trait
// =============================================================================

/// Trait for batch speech-to-text services
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Transcribes a batch of audio files. Results are positional: result
    /// *i* corresponds to `audio_paths[i]`. There is no partial success.
    async fn transcribe_batch(
        &self,
        audio_paths: &[String],
    ) -> PipelineResult<Vec<ClipTranscription>>;
}

// =============================================================================
// Retry Helper
// =============================================================================

/// Runs `operation` up to `schedule.len()` times, sleeping the fixed delay
/// `schedule[k]` after failed attempt *k+1*. The final schedule slot is
/// never slept; the last attempt's error is returned as-is.
pub async fn retry_with_schedule<T, F, Fut>(
    schedule: &[Duration],
    operation_name: &str,
    operation: F,
) -> PipelineResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = PipelineResult<T>>,
{
    let attempts = schedule.len().max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt + 1 == attempts {
                    return Err(e);
                }
                let delay = schedule[attempt];
                warn!(
                    "{} attempt {}/{} failed, retrying in {:?}: {}",
                    operation_name,
                    attempt + 1,
                    attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        PipelineError::TranscriptionService(format!("{} failed with no attempts", operation_name))
    }))
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
struct TranscribeRequest<'a> {
    audios: &'a [String],
}

/// One response entry: the service returns `[transcription, audioPath]`
/// pairs positionally. `segments` is mandatory; its absence (e.g. an
/// inline error object) is a structural failure for the whole batch.
#[derive(Deserialize)]
struct TranscriptionPayload {
    #[serde(default)]
    segments: Option<Vec<TranscriptSegment>>,
}

// =============================================================================
// HTTP Client
// =============================================================================

/// HTTP client for the batch transcription endpoint
pub struct HttpTranscriptionClient {
    client: reqwest::Client,
    base_url: String,
    retry_schedule: Vec<Duration>,
}

impl HttpTranscriptionClient {
    /// Creates a new client with the default endpoint and retry schedule
    pub fn new() -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                PipelineError::TranscriptionService(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_schedule: TRANSCRIPTION_RETRY_SCHEDULE.to_vec(),
        })
    }

    /// Sets a custom base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets a custom retry schedule (length = attempt count)
    pub fn with_retry_schedule(mut self, schedule: Vec<Duration>) -> Self {
        self.retry_schedule = schedule;
        self
    }

    /// Cheap connectivity probe against the service's ping endpoint
    pub async fn health_check(&self) -> PipelineResult<()> {
        let url = format!("{}/ping", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            PipelineError::TranscriptionService(format!("Health check failed: {}", e))
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PipelineError::TranscriptionService(format!(
                "Health check failed with status {}",
                response.status()
            )))
        }
    }

    /// One transcription attempt, no retries
    async fn request_batch(&self, audio_paths: &[String]) -> PipelineResult<Vec<ClipTranscription>> {
        let url = format!("{}/transcribe", self.base_url);
        debug!("requesting transcription for {} clips", audio_paths.len());

        let response = self
            .client
            .post(&url)
            .json(&TranscribeRequest {
                audios: audio_paths,
            })
            .send()
            .await
            .map_err(|e| PipelineError::TranscriptionService(format!("Network error: {}", e)))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PipelineError::TranscriptionService(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            let truncated: String = body.chars().take(500).collect();
            return Err(PipelineError::TranscriptionService(format!(
                "Service error ({}): {}",
                status, truncated
            )));
        }

        // Top-level array of [transcription, audioPath] pairs is required
        let pairs: Vec<(TranscriptionPayload, String)> =
            serde_json::from_str(&body).map_err(|e| {
                PipelineError::TranscriptionService(format!(
                    "Expected array of transcription pairs: {}",
                    e
                ))
            })?;

        if pairs.len() != audio_paths.len() {
            return Err(PipelineError::TranscriptionService(format!(
                "Expected {} transcriptions, got {}",
                audio_paths.len(),
                pairs.len()
            )));
        }

        pairs
            .into_iter()
            .map(|(payload, audio_path)| {
                let segments = payload.segments.ok_or_else(|| {
                    PipelineError::TranscriptionService(format!(
                        "Missing segments for {}",
                        audio_path
                    ))
                })?;
                Ok(ClipTranscription::new(segments))
            })
            .collect()
    }
}

#[async_trait]
impl TranscriptionService for HttpTranscriptionClient {
    async fn transcribe_batch(
        &self,
        audio_paths: &[String],
    ) -> PipelineResult<Vec<ClipTranscription>> {
        retry_with_schedule(&self.retry_schedule, "transcription", || {
            self.request_batch(audio_paths)
        })
        .await
    }
}

// =============================================================================
// Mock Service (for testing)
// =============================================================================

/// Scriptable transcription service for tests: fails a configured number of
/// times, then returns one canned [`ClipTranscription`] per input path.
pub struct MockTranscriptionService {
    transcriptions: Vec<ClipTranscription>,
    failures_remaining: AtomicUsize,
    attempts: AtomicUsize,
}

impl MockTranscriptionService {
    /// Creates a mock returning the given transcriptions positionally
    pub fn new(transcriptions: Vec<ClipTranscription>) -> Self {
        Self {
            transcriptions,
            failures_remaining: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Makes the first `count` calls fail
    pub fn with_failures(self, count: usize) -> Self {
        self.failures_remaining.store(count, Ordering::SeqCst);
        self
    }

    /// Number of calls received so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionService for MockTranscriptionService {
    async fn transcribe_batch(
        &self,
        audio_paths: &[String],
    ) -> PipelineResult<Vec<ClipTranscription>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(PipelineError::TranscriptionService(
                "mock transcription failure".to_string(),
            ));
        }

        if audio_paths.len() != self.transcriptions.len() {
            return Err(PipelineError::TranscriptionService(format!(
                "mock configured for {} clips, got {}",
                self.transcriptions.len(),
                audio_paths.len()
            )));
        }

        Ok(self.transcriptions.clone())
    }
}

// =============================================================================
// Tests
// =============================================================================
