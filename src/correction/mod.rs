//! Caption Text Correction
//!
//! Batched rewrite of caption files using the ground-truth dialogue text as
//! a reference. Correction changes words only; a response that touches the
//! timestamp lines is rejected before the file is overwritten, since a
//! drifted timestamp would silently desynchronize every later caption.

use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::{PipelineError, PipelineResult};

mod claude;
pub use claude::*;

// =============================================================================
// Service Trait
// =============================================================================

/// Trait for caption text-correction services
#[async_trait]
pub trait CorrectionService: Send + Sync {
    /// Returns the corrected SRT text for `srt_text`, using `dialogue_text`
    /// as the ground truth. The contract forbids the service from returning
    /// anything except the caption content itself.
    async fn correct(&self, dialogue_text: &str, srt_text: &str) -> PipelineResult<String>;
}

// =============================================================================
// Correction Job
// =============================================================================

/// One caption file to correct, paired with its ground-truth dialogue line
#[derive(Clone, Debug)]
pub struct CorrectionJob {
    /// The dialogue text the clip was synthesized from
    pub dialogue_text: String,
    /// Path to the caption file to rewrite in place
    pub caption_path: PathBuf,
}

impl CorrectionJob {
    /// Creates a new correction job
    pub fn new(dialogue_text: impl Into<String>, caption_path: impl Into<PathBuf>) -> Self {
        Self {
            dialogue_text: dialogue_text.into(),
            caption_path: caption_path.into(),
        }
    }
}

// =============================================================================
// Timestamp Preservation
// =============================================================================

fn timestamp_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d{2}:\d{2}:\d{2},\d{3} --> \d{2}:\d{2}:\d{2},\d{3}")
            .expect("timestamp regex is valid")
    })
}

/// Extracts every `start --> end` line, in order
fn timestamp_lines(srt_text: &str) -> Vec<&str> {
    timestamp_line_regex()
        .find_iter(srt_text)
        .map(|m| m.as_str())
        .collect()
}

/// Verifies that `corrected` carries exactly the timestamp lines of
/// `original`, in the same order
fn verify_timestamps_preserved(original: &str, corrected: &str) -> PipelineResult<()> {
    let before = timestamp_lines(original);
    let after = timestamp_lines(corrected);

    if before != after {
        return Err(PipelineError::CorrectionService(format!(
            "Corrected text altered timestamps ({} timing lines in, {} out)",
            before.len(),
            after.len()
        )));
    }

    Ok(())
}

// =============================================================================
// Batch Corrector
// =============================================================================

/// Rewrites caption files in fixed-size batches with an inter-batch delay.
///
/// A failure on any file aborts the run: files already rewritten stay
/// rewritten, files not yet reached stay untouched. Re-running is safe
/// because correcting an already-corrected file is a no-op for the service.
pub struct BatchCorrector {
    service: Arc<dyn CorrectionService>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchCorrector {
    /// Creates a corrector with the configured batch size and delay
    pub fn new(service: Arc<dyn CorrectionService>, config: &PipelineConfig) -> Self {
        Self {
            service,
            batch_size: config.correction_batch_size.max(1),
            batch_delay: config.correction_batch_delay,
        }
    }

    /// Corrects every caption file in order
    pub async fn run(&self, jobs: &[CorrectionJob]) -> PipelineResult<()> {
        let batch_count = jobs.len().div_ceil(self.batch_size);

        for (batch_index, batch) in jobs.chunks(self.batch_size).enumerate() {
            info!(
                "correcting batch {}/{} ({} files)",
                batch_index + 1,
                batch_count,
                batch.len()
            );

            for job in batch {
                self.correct_file(job).await?;
            }

            if batch_index + 1 < batch_count {
                info!(
                    "batch complete, waiting {:?} before the next batch",
                    self.batch_delay
                );
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        Ok(())
    }

    /// Corrects a single caption file in place
    async fn correct_file(&self, job: &CorrectionJob) -> PipelineResult<()> {
        let original = std::fs::read_to_string(&job.caption_path)?;
        let corrected = self
            .service
            .correct(&job.dialogue_text, &original)
            .await?;

        if let Err(e) = verify_timestamps_preserved(&original, &corrected) {
            warn!(
                "rejecting correction for {}: {}",
                job.caption_path.display(),
                e
            );
            return Err(e);
        }

        std::fs::write(&job.caption_path, corrected)?;
        Ok(())
    }
}

// =============================================================================
// Mock Service (for testing)
// =============================================================================

/// Scriptable correction service for tests. Echoes the SRT text unchanged
/// unless a fixed response or failure is configured.
pub struct MockCorrectionService {
    response: Option<String>,
    available: bool,
    calls: AtomicUsize,
}

impl MockCorrectionService {
    /// Creates an echoing mock
    pub fn new() -> Self {
        Self {
            response: None,
            available: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns a fixed response instead of echoing
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Makes every call fail
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Number of corrections requested so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCorrectionService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CorrectionService for MockCorrectionService {
    async fn correct(&self, _dialogue_text: &str, srt_text: &str) -> PipelineResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.available {
            return Err(PipelineError::CorrectionService(
                "mock correction failure".to_string(),
            ));
        }

        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| srt_text.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================
