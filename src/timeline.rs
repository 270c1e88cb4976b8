//! Timeline Accumulator
//!
//! Renumbers each clip's local word timings onto a single strictly
//! increasing global timeline and emits one caption file per clip. The
//! global offset is an explicit fold over the clip sequence: after each
//! clip it advances by the clip's measured audio duration plus the
//! configured inter-clip gap.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::captions::{format_block, render_blocks, CaptionBlock, CaptionFile, WordTiming};
use crate::config::PipelineConfig;
use crate::media::DurationProbe;
use crate::transcribe::{ClipTranscription, TranscriptionService};
use crate::{ClipRef, PipelineResult, TimeSec};

/// Builds globally-timed caption files from synthesized clips
pub struct TimelineAccumulator {
    transcriber: Arc<dyn TranscriptionService>,
    probe: Arc<dyn DurationProbe>,
    config: PipelineConfig,
}

impl TimelineAccumulator {
    /// Creates a new accumulator
    pub fn new(
        transcriber: Arc<dyn TranscriptionService>,
        probe: Arc<dyn DurationProbe>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            transcriber,
            probe,
            config,
        }
    }

    /// Transcribes all clips and writes one caption file per clip under
    /// `output_dir`.
    ///
    /// Clips are processed in `sequence_index` order. A transcription
    /// failure aborts the whole run before any file is written; a failure
    /// mid-run stops before any later clip's file is written.
    pub async fn run(
        &self,
        clips: &[ClipRef],
        output_dir: &Path,
    ) -> PipelineResult<Vec<CaptionFile>> {
        let mut ordered: Vec<&ClipRef> = clips.iter().collect();
        ordered.sort_by_key(|c| c.sequence_index);

        let audio_paths: Vec<String> = ordered.iter().map(|c| c.file_path.clone()).collect();
        let transcriptions = self.transcriber.transcribe_batch(&audio_paths).await?;

        let mut files = Vec::with_capacity(ordered.len());
        let mut global_offset_sec: TimeSec = 0.0;

        for (clip, transcription) in ordered.iter().zip(&transcriptions) {
            debug!(
                "clip {} ({}) starts at offset {:.3}s",
                clip.sequence_index, clip.file_path, global_offset_sec
            );

            let blocks = Self::clip_blocks(clip, transcription, global_offset_sec)?;
            let file = CaptionFile::new(clip.caption_file_name(), render_blocks(&blocks)?);
            file.write_to(output_dir)?;
            info!(
                "wrote {} caption blocks to {}",
                blocks.len(),
                file.file_name
            );
            files.push(file);

            let duration = self.probe.duration_sec(Path::new(&clip.file_path))?;
            global_offset_sec += duration + self.config.inter_clip_gap_sec;
        }

        Ok(files)
    }

    /// Emits one caption block per word on the global timeline.
    ///
    /// A word's displayed end is the next word's start within the same
    /// clip, which removes inter-word silence so captions read
    /// continuously; the clip's last word keeps its own end.
    fn clip_blocks(
        clip: &ClipRef,
        transcription: &ClipTranscription,
        offset_sec: TimeSec,
    ) -> PipelineResult<Vec<CaptionBlock>> {
        let words = transcription.flatten_words();
        let mut blocks = Vec::with_capacity(words.len());

        for (j, word) in words.iter().enumerate() {
            let start_sec = word.start_sec + offset_sec;
            let end_sec = match words.get(j + 1) {
                Some(next) => next.start_sec + offset_sec,
                None => word.end_sec + offset_sec,
            };

            let index = (j + 1) as u32;
            blocks.push(CaptionBlock {
                index,
                start_sec,
                end_sec,
                text: word.word.clone(),
                raw_block: format_block(index, start_sec, end_sec, &word.word)?,
                source_file_index: clip.sequence_index,
                words: vec![WordTiming::new(word.word.clone(), start_sec, end_sec)],
            });
        }

        Ok(blocks)
    }
}

// =============================================================================
// Tests
// =============================================================================
