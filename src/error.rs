//! Subweave Error Definitions
//!
//! Defines error types used throughout the project.

use thiserror::Error;

use super::TimeSec;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    // =========================================================================
    // Timecode Errors
    // =========================================================================
    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Invalid duration: {0} seconds")]
    InvalidDuration(TimeSec),

    // =========================================================================
    // Service Errors
    // =========================================================================
    #[error("Transcription service error: {0}")]
    TranscriptionService(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Correction service error: {0}")]
    CorrectionService(String),

    // =========================================================================
    // Media Errors
    // =========================================================================
    #[error("FFprobe error: {0}")]
    FFprobeError(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Pipeline result type
pub type PipelineResult<T> = Result<T, PipelineError>;
