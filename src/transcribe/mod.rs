//! Speech-to-Text Transcription
//!
//! Batch transcription of synthesized clips against an external
//! speech-to-text service, with bounded retries on a fixed schedule.

mod models;
pub use models::*;

mod client;
pub use client::*;
