//! Pipeline Configuration
//!
//! Named configuration for the timing constants shared across components.
//! The inter-clip gap in particular is a cross-component contract: it must
//! match the silence the audio-concatenation step inserts between clips, or
//! subtitles drift out of sync with the rendered audio.

use std::time::Duration;

use crate::TimeSec;

// =============================================================================
// Constants
// =============================================================================

/// Silence inserted between concatenated clips, in seconds.
///
/// Shared with the audio-concatenation step; both sides must agree.
pub const INTER_CLIP_GAP_SEC: TimeSec = 0.25;

/// Minimum display duration for a merged caption block, in seconds
pub const MIN_CAPTION_DURATION_SEC: TimeSec = 0.5;

/// Fixed delays between transcription attempts. The schedule length defines
/// the total attempt count; the final slot is never slept.
pub const TRANSCRIPTION_RETRY_SCHEDULE: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(3),
];

/// Number of caption files corrected per batch
pub const CORRECTION_BATCH_SIZE: usize = 5;

/// Delay between correction batches (not applied after the last batch)
pub const CORRECTION_BATCH_DELAY: Duration = Duration::from_secs(30);

// =============================================================================
// PipelineConfig
// =============================================================================

/// Configuration for a subtitle pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Gap added to the global offset after each clip, in seconds
    pub inter_clip_gap_sec: TimeSec,
    /// Minimum caption duration enforced by the display merger, in seconds
    pub min_caption_duration_sec: TimeSec,
    /// Delays between transcription attempts; length = attempt count
    pub retry_schedule: Vec<Duration>,
    /// Caption files corrected per batch
    pub correction_batch_size: usize,
    /// Delay between correction batches
    pub correction_batch_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inter_clip_gap_sec: INTER_CLIP_GAP_SEC,
            min_caption_duration_sec: MIN_CAPTION_DURATION_SEC,
            retry_schedule: TRANSCRIPTION_RETRY_SCHEDULE.to_vec(),
            correction_batch_size: CORRECTION_BATCH_SIZE,
            correction_batch_delay: CORRECTION_BATCH_DELAY,
        }
    }
}

impl PipelineConfig {
    /// Sets the inter-clip gap
    pub fn with_inter_clip_gap(mut self, gap_sec: TimeSec) -> Self {
        self.inter_clip_gap_sec = gap_sec;
        self
    }

    /// Sets the minimum caption duration
    pub fn with_min_caption_duration(mut self, duration_sec: TimeSec) -> Self {
        self.min_caption_duration_sec = duration_sec;
        self
    }

    /// Sets the transcription retry schedule
    pub fn with_retry_schedule(mut self, schedule: Vec<Duration>) -> Self {
        self.retry_schedule = schedule;
        self
    }

    /// Sets the correction batch size
    pub fn with_correction_batch_size(mut self, size: usize) -> Self {
        self.correction_batch_size = size.max(1);
        self
    }

    /// Sets the correction inter-batch delay
    pub fn with_correction_batch_delay(mut self, delay: Duration) -> Self {
        self.correction_batch_delay = delay;
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
