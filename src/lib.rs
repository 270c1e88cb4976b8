//! Subweave Subtitle Engine
//!
//! Turns a sequence of independently synthesized speech clips (one per
//! dialogue line) into a single, correctly-timed, word-level-accurate SRT
//! subtitle track on a global timeline, optionally refined by an LLM
//! text-correction pass.

pub mod captions;
pub mod config;
pub mod correction;
pub mod media;
pub mod pipeline;
pub mod synthesis;
pub mod timecode;
pub mod timeline;
pub mod transcribe;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
