//! Media Probing
//!
//! Audio duration measurement via ffprobe. The timeline accumulator needs
//! each clip's real duration to advance the global offset; probing is
//! abstracted behind a trait so tests can supply fixed values.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::{PipelineError, PipelineResult, TimeSec};

// =============================================================================
// Probe Trait
// =============================================================================

/// Measures the duration of an audio artifact
pub trait DurationProbe: Send + Sync {
    /// Returns the duration of the file at `path` in seconds
    fn duration_sec(&self, path: &Path) -> PipelineResult<TimeSec>;
}

// =============================================================================
// FFprobe Implementation
// =============================================================================

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Duration probe backed by the `ffprobe` binary on PATH
#[derive(Debug, Default)]
pub struct FfprobeDurationProbe;

impl FfprobeDurationProbe {
    /// Creates a new probe
    pub fn new() -> Self {
        Self
    }

    /// Checks whether ffprobe is available on PATH
    pub fn is_available() -> bool {
        Command::new("ffprobe")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Parses ffprobe JSON output into a duration
    fn parse_ffprobe_output(json: &str) -> PipelineResult<TimeSec> {
        let output: FfprobeOutput = serde_json::from_str(json)
            .map_err(|e| PipelineError::FFprobeError(format!("Failed to parse output: {}", e)))?;

        let duration = output
            .format
            .and_then(|f| f.duration)
            .ok_or_else(|| PipelineError::FFprobeError("No duration in output".to_string()))?;

        duration
            .parse()
            .map_err(|e| PipelineError::FFprobeError(format!("Invalid duration value: {}", e)))
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn duration_sec(&self, path: &Path) -> PipelineResult<TimeSec> {
        if !path.exists() {
            return Err(PipelineError::FFprobeError(format!(
                "File not found: {}",
                path.display()
            )));
        }

        let output = Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .map_err(|e| PipelineError::FFprobeError(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(PipelineError::FFprobeError(format!(
                "ffprobe exited with {} for {}",
                output.status,
                path.display()
            )));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let duration = Self::parse_ffprobe_output(&json)?;
        debug!("probed {}: {:.3}s", path.display(), duration);
        Ok(duration)
    }
}

// =============================================================================
// Fixed Probe (for testing)
// =============================================================================

/// Probe returning pre-registered durations keyed by file name
#[derive(Debug, Default)]
pub struct FixedDurationProbe {
    durations: HashMap<String, TimeSec>,
}

impl FixedDurationProbe {
    /// Creates an empty probe
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a duration for a file name
    pub fn with_duration(mut self, file_name: impl Into<String>, duration_sec: TimeSec) -> Self {
        self.durations.insert(file_name.into(), duration_sec);
        self
    }
}

impl DurationProbe for FixedDurationProbe {
    fn duration_sec(&self, path: &Path) -> PipelineResult<TimeSec> {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        self.durations.get(&key).copied().ok_or_else(|| {
            PipelineError::FFprobeError(format!("No registered duration for {}", key))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
