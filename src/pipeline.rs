//! Pipeline Control Flow
//!
//! Drives the subtitle run end to end: the timeline accumulator produces
//! one caption file per clip on the global timeline, then the batch
//! corrector rewrites caption text in place. Everything is sequential: the
//! external services are rate-limited, and the global offset fold needs no
//! synchronization when only one clip is in flight.

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::captions::CaptionFile;
use crate::config::PipelineConfig;
use crate::correction::{BatchCorrector, CorrectionJob, CorrectionService};
use crate::media::DurationProbe;
use crate::timeline::TimelineAccumulator;
use crate::transcribe::TranscriptionService;
use crate::{ClipRef, DialogueEntry, PipelineError, PipelineResult};

/// End-to-end subtitle pipeline
pub struct SubtitlePipeline {
    transcriber: Arc<dyn TranscriptionService>,
    probe: Arc<dyn DurationProbe>,
    corrector: Option<Arc<dyn CorrectionService>>,
    config: PipelineConfig,
}

impl SubtitlePipeline {
    /// Creates a pipeline without a correction pass
    pub fn new(transcriber: Arc<dyn TranscriptionService>, probe: Arc<dyn DurationProbe>) -> Self {
        Self {
            transcriber,
            probe,
            corrector: None,
            config: PipelineConfig::default(),
        }
    }

    /// Overrides the configuration
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables the correction pass
    pub fn with_corrector(mut self, corrector: Arc<dyn CorrectionService>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    /// Runs the pipeline: caption files are written under `output_dir`,
    /// then corrected in place when a corrector is configured. Returns the
    /// final caption files, re-read after correction.
    pub async fn run(
        &self,
        dialogue: &[DialogueEntry],
        clips: &[ClipRef],
        output_dir: &Path,
    ) -> PipelineResult<Vec<CaptionFile>> {
        std::fs::create_dir_all(output_dir)?;

        let accumulator = TimelineAccumulator::new(
            self.transcriber.clone(),
            self.probe.clone(),
            self.config.clone(),
        );
        let mut files = accumulator.run(clips, output_dir).await?;
        info!("accumulated {} caption files", files.len());

        let Some(corrector) = &self.corrector else {
            return Ok(files);
        };

        let jobs = Self::correction_jobs(dialogue, clips, &files, output_dir)?;
        BatchCorrector::new(corrector.clone(), &self.config)
            .run(&jobs)
            .await?;

        // Correction rewrote the files on disk; pick up the final text
        for file in &mut files {
            file.content = std::fs::read_to_string(output_dir.join(&file.file_name))?;
        }

        Ok(files)
    }

    /// Pairs each caption file with its ground-truth dialogue line via the
    /// clip's `sequence_index`
    fn correction_jobs(
        dialogue: &[DialogueEntry],
        clips: &[ClipRef],
        files: &[CaptionFile],
        output_dir: &Path,
    ) -> PipelineResult<Vec<CorrectionJob>> {
        let mut ordered: Vec<&ClipRef> = clips.iter().collect();
        ordered.sort_by_key(|c| c.sequence_index);

        ordered
            .iter()
            .zip(files)
            .map(|(clip, file)| {
                let entry = dialogue.get(clip.sequence_index).ok_or_else(|| {
                    PipelineError::CorrectionService(format!(
                        "No dialogue entry for clip {}",
                        clip.sequence_index
                    ))
                })?;
                Ok(CorrectionJob::new(
                    entry.text.clone(),
                    output_dir.join(&file.file_name),
                ))
            })
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::assemble_display_track;
    use crate::config::MIN_CAPTION_DURATION_SEC;
    use crate::correction::MockCorrectionService;
    use crate::media::FixedDurationProbe;
    use crate::transcribe::{ClipTranscription, MockTranscriptionService, TranscriptSegment};
    use std::time::Duration;

    fn dialogue() -> Vec<DialogueEntry> {
        vec![
            DialogueEntry::new("narrator", "hello world"),
            DialogueEntry::new("redpill", "goodbye now"),
        ]
    }

    fn clips() -> Vec<ClipRef> {
        vec![
            ClipRef::new("narrator", "voice/narrator-0.mp3", 0),
            ClipRef::new("redpill", "voice/redpill-1.mp3", 1),
        ]
    }

    fn services() -> (Arc<MockTranscriptionService>, Arc<FixedDurationProbe>) {
        let transcriber = Arc::new(MockTranscriptionService::new(vec![
            ClipTranscription::new(vec![TranscriptSegment::new(0.0, 2.0, "helo world")]),
            ClipTranscription::new(vec![TranscriptSegment::new(0.0, 3.0, "goodbye now")]),
        ]));
        let probe = Arc::new(
            FixedDurationProbe::new()
                .with_duration("narrator-0.mp3", 2.0)
                .with_duration("redpill-1.mp3", 3.0),
        );
        (transcriber, probe)
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig::default().with_correction_batch_delay(Duration::ZERO)
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[tokio::test]
    async fn test_run_without_corrector() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let (transcriber, probe) = services();

        let pipeline = SubtitlePipeline::new(transcriber, probe);
        let files = pipeline
            .run(&dialogue(), &clips(), dir.path())
            .await
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].content.contains("helo"));
    }

    #[tokio::test]
    async fn test_run_with_echo_corrector() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let (transcriber, probe) = services();
        let corrector = Arc::new(MockCorrectionService::new());

        let pipeline = SubtitlePipeline::new(transcriber, probe)
            .with_config(fast_config())
            .with_corrector(corrector.clone());

        let files = pipeline
            .run(&dialogue(), &clips(), dir.path())
            .await
            .unwrap();

        // One correction call per caption file, timestamps untouched
        assert_eq!(corrector.calls(), 2);
        assert!(files[0].content.contains("00:00:00,000 --> 00:00:01,000"));
        assert!(files[1].content.contains("00:00:02,250 --> 00:00:03,750"));
    }

    #[tokio::test]
    async fn test_corrupting_corrector_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let (transcriber, probe) = services();
        // Fixed response whose timing lines match no input file
        let corrector = Arc::new(
            MockCorrectionService::new()
                .with_response("1\n00:09:00,000 --> 00:09:01,000\nhello"),
        );

        let pipeline = SubtitlePipeline::new(transcriber, probe)
            .with_config(fast_config())
            .with_corrector(corrector);

        let result = pipeline.run(&dialogue(), &clips(), dir.path()).await;
        assert!(matches!(
            result.unwrap_err(),
            PipelineError::CorrectionService(_)
        ));

        // The rejected file still carries the accumulator's output
        let content = std::fs::read_to_string(dir.path().join("narrator-0.srt")).unwrap();
        assert!(content.contains("helo"));
    }

    #[tokio::test]
    async fn test_display_track_from_pipeline_output() {
        let dir = tempfile::tempdir().unwrap();
        let (transcriber, probe) = services();

        let pipeline = SubtitlePipeline::new(transcriber, probe);
        let files = pipeline
            .run(&dialogue(), &clips(), dir.path())
            .await
            .unwrap();

        let track = assemble_display_track(&files, MIN_CAPTION_DURATION_SEC).unwrap();

        // Word blocks survive (all are >= 0.5s here), in global time order
        assert!(!track.is_empty());
        for pair in track.windows(2) {
            assert!(pair[0].start_sec <= pair[1].start_sec);
        }
        let text: Vec<&str> = track.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(text.join(" "), "helo world goodbye now");
    }

    #[tokio::test]
    async fn test_missing_dialogue_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (transcriber, probe) = services();
        let corrector = Arc::new(MockCorrectionService::new());

        let pipeline = SubtitlePipeline::new(transcriber, probe)
            .with_config(fast_config())
            .with_corrector(corrector);

        // Only one dialogue entry for two clips
        let short_dialogue = vec![DialogueEntry::new("narrator", "hello world")];
        let result = pipeline.run(&short_dialogue, &clips(), dir.path()).await;

        assert!(matches!(
            result.unwrap_err(),
            PipelineError::CorrectionService(_)
        ));
    }
}
