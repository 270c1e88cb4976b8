//! SRT Serialization and Parsing
//!
//! The on-disk caption format: blocks separated by a blank line, each block
//! an index line, a `HH:MM:SS,mmm --> HH:MM:SS,mmm` line, and one or more
//! text lines. The accumulator writes this shape and the renderer re-parses
//! it; both go through the functions here.

use tracing::debug;

use super::{interpolate_word_timings, CaptionBlock};
use crate::timecode::{format_timestamp, parse_timestamp};
use crate::{ClipIndex, PipelineError, PipelineResult, TimeSec};

// =============================================================================
// Serialization
// =============================================================================

/// Renders a single SRT block (no trailing blank line)
pub fn format_block(
    index: u32,
    start_sec: TimeSec,
    end_sec: TimeSec,
    text: &str,
) -> PipelineResult<String> {
    Ok(format!(
        "{}\n{} --> {}\n{}",
        index,
        format_timestamp(start_sec)?,
        format_timestamp(end_sec)?,
        text
    ))
}

/// Renders caption blocks as full SRT file content
pub fn render_blocks(blocks: &[CaptionBlock]) -> PipelineResult<String> {
    let mut output = String::new();

    for block in blocks {
        output.push_str(&format_block(
            block.index,
            block.start_sec,
            block.end_sec,
            &block.text,
        )?);
        output.push_str("\n\n");
    }

    Ok(output.trim_end().to_string())
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses SRT content into caption blocks tagged with `source_file_index`.
///
/// Blocks missing an index, time line, or text are skipped; a time line
/// that is present but malformed is an error. Word timings are interpolated
/// evenly across each block's time range.
pub fn parse_blocks(
    content: &str,
    source_file_index: ClipIndex,
) -> PipelineResult<Vec<CaptionBlock>> {
    let mut blocks = Vec::new();

    for raw_block in content.split("\n\n") {
        let lines: Vec<&str> = raw_block.lines().collect();
        if lines.len() < 3 {
            if !raw_block.trim().is_empty() {
                debug!("skipping incomplete caption block: {:?}", raw_block);
            }
            continue;
        }

        let index: u32 = match lines[0].trim().parse() {
            Ok(index) => index,
            Err(_) => {
                debug!("skipping caption block with non-numeric index: {:?}", lines[0]);
                continue;
            }
        };

        let (start_sec, end_sec) = parse_time_line(lines[1])?;
        let text = lines[2..].join(" ");
        let words = interpolate_word_timings(&text, start_sec, end_sec);

        blocks.push(CaptionBlock {
            index,
            start_sec,
            end_sec,
            text,
            raw_block: raw_block.to_string(),
            source_file_index,
            words,
        });
    }

    Ok(blocks)
}

/// Parses a `start --> end` time line
fn parse_time_line(line: &str) -> PipelineResult<(TimeSec, TimeSec)> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| PipelineError::MalformedTimestamp(line.to_string()))?;

    Ok((parse_timestamp(start.trim())?, parse_timestamp(end.trim())?))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn block(index: u32, start: TimeSec, end: TimeSec, text: &str) -> CaptionBlock {
        CaptionBlock {
            index,
            start_sec: start,
            end_sec: end,
            text: text.to_string(),
            raw_block: String::new(),
            source_file_index: 0,
            words: vec![],
        }
    }

    // -------------------------------------------------------------------------
    // Serialization Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_block() {
        let rendered = format_block(1, 0.0, 1.25, "hello").unwrap();
        assert_eq!(rendered, "1\n00:00:00,000 --> 00:00:01,250\nhello");
    }

    #[test]
    fn test_render_blocks() {
        let blocks = vec![block(1, 0.0, 1.0, "hello"), block(2, 1.0, 2.0, "world")];
        let srt = render_blocks(&blocks).unwrap();

        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:01,000\nhello\n\n2\n00:00:01,000 --> 00:00:02,000\nworld"
        );
    }

    #[test]
    fn test_render_rejects_negative_times() {
        let blocks = vec![block(1, -1.0, 1.0, "bad")];
        assert!(render_blocks(&blocks).is_err());
    }

    // -------------------------------------------------------------------------
    // Parsing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_blocks_basic() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello World\n\n2\n00:00:05,500 --> 00:00:08,000\nSecond caption";

        let blocks = parse_blocks(srt, 3).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start_sec, 1.0);
        assert_eq!(blocks[0].end_sec, 4.0);
        assert_eq!(blocks[0].text, "Hello World");
        assert_eq!(blocks[0].source_file_index, 3);
        assert_eq!(blocks[1].index, 2);
        assert_eq!(blocks[1].start_sec, 5.5);
    }

    #[test]
    fn test_parse_blocks_joins_multiline_text() {
        let srt = "1\n00:00:00,000 --> 00:00:05,000\nLine one\nLine two";
        let blocks = parse_blocks(srt, 0).unwrap();
        assert_eq!(blocks[0].text, "Line one Line two");
    }

    #[test]
    fn test_parse_blocks_interpolates_words() {
        let srt = "1\n00:00:00,000 --> 00:00:02,000\nhello world";
        let blocks = parse_blocks(srt, 0).unwrap();

        let words = &blocks[0].words;
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].start_sec, 0.0);
        assert_eq!(words[0].end_sec, 1.0);
        assert_eq!(words[1].end_sec, 2.0);
    }

    #[test]
    fn test_parse_blocks_skips_incomplete() {
        let srt = "1\n00:00:00,000 --> 00:00:01,000\nok\n\norphan line\n\n2\n00:00:01,000 --> 00:00:02,000\nstill ok";
        let blocks = parse_blocks(srt, 0).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text, "still ok");
    }

    #[test]
    fn test_parse_blocks_malformed_timestamp_fails() {
        let srt = "1\n00:00:bad --> 00:00:01,000\ntext";
        let result = parse_blocks(srt, 0);
        assert!(matches!(
            result.unwrap_err(),
            PipelineError::MalformedTimestamp(_)
        ));
    }

    #[test]
    fn test_parse_keeps_raw_block() {
        let srt = "1\n00:00:00,000 --> 00:00:01,000\nhello";
        let blocks = parse_blocks(srt, 0).unwrap();
        assert_eq!(blocks[0].raw_block, srt);
    }

    // -------------------------------------------------------------------------
    // Roundtrip Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_render_parse_roundtrip() {
        let original = vec![block(1, 0.0, 1.5, "first"), block(2, 1.5, 3.0, "second bit")];
        let srt = render_blocks(&original).unwrap();
        let parsed = parse_blocks(&srt, 0).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].start_sec, original[0].start_sec);
        assert_eq!(parsed[0].text, original[0].text);
        assert_eq!(parsed[1].end_sec, original[1].end_sec);
    }
}
