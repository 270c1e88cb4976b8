//! Caption Block Merger
//!
//! Collapses caption blocks too short to read into their successors while
//! preserving concatenated text and word-level timing. Applied at display
//! time wherever caption files are consumed; the accumulator never persists
//! merged output.

use super::{format_block, parse_blocks, CaptionBlock, CaptionFile};
use crate::{PipelineResult, TimeSec};

/// Merges blocks shorter than `min_duration_sec` into the block that
/// follows them.
///
/// The accumulator block keeps absorbing successors until its duration
/// reaches the threshold: the end time extends, text concatenates with a
/// single space, word-timing lists concatenate, and the raw block text is
/// rebuilt over the merged range. The final accumulator always flushes, so
/// every output block except possibly the last has duration
/// `>= min_duration_sec`.
pub fn merge_short_blocks(
    blocks: Vec<CaptionBlock>,
    min_duration_sec: TimeSec,
) -> PipelineResult<Vec<CaptionBlock>> {
    let mut merged: Vec<CaptionBlock> = Vec::with_capacity(blocks.len());
    let mut current: Option<CaptionBlock> = None;

    for block in blocks {
        let Some(mut acc) = current.take() else {
            current = Some(block);
            continue;
        };

        if acc.duration() < min_duration_sec {
            acc.end_sec = block.end_sec;
            acc.text.push(' ');
            acc.text.push_str(&block.text);
            acc.words.extend(block.words);
            acc.raw_block = format_block(acc.index, acc.start_sec, acc.end_sec, &acc.text)?;
            current = Some(acc);
        } else {
            merged.push(acc);
            current = Some(block);
        }
    }

    if let Some(last) = current {
        merged.push(last);
    }

    Ok(merged)
}

/// Builds the display track the renderer consumes: parses every caption
/// file, flattens, sorts by start time, and applies [`merge_short_blocks`].
pub fn assemble_display_track(
    files: &[CaptionFile],
    min_duration_sec: TimeSec,
) -> PipelineResult<Vec<CaptionBlock>> {
    let mut blocks = Vec::new();
    for (file_index, file) in files.iter().enumerate() {
        blocks.extend(parse_blocks(&file.content, file_index)?);
    }

    blocks.sort_by(|a, b| {
        a.start_sec
            .partial_cmp(&b.start_sec)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    merge_short_blocks(blocks, min_duration_sec)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::interpolate_word_timings;
    use crate::config::MIN_CAPTION_DURATION_SEC;

    fn block(index: u32, start: TimeSec, end: TimeSec, text: &str) -> CaptionBlock {
        CaptionBlock {
            index,
            start_sec: start,
            end_sec: end,
            text: text.to_string(),
            raw_block: format_block(index, start, end, text).unwrap(),
            source_file_index: 0,
            words: interpolate_word_timings(text, start, end),
        }
    }

    #[test]
    fn test_short_block_folds_into_next() {
        let blocks = vec![block(1, 0.0, 0.2, "hi"), block(2, 0.2, 1.0, "there")];
        let merged = merge_short_blocks(blocks, MIN_CAPTION_DURATION_SEC).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start_sec, 0.0);
        assert_eq!(merged[0].end_sec, 1.0);
        assert_eq!(merged[0].text, "hi there");
        assert_eq!(merged[0].words.len(), 2);
    }

    #[test]
    fn test_long_blocks_pass_through() {
        let blocks = vec![block(1, 0.0, 0.8, "one"), block(2, 0.8, 1.6, "two")];
        let merged = merge_short_blocks(blocks, MIN_CAPTION_DURATION_SEC).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "one");
        assert_eq!(merged[1].text, "two");
    }

    #[test]
    fn test_chain_of_short_blocks_accumulates() {
        let blocks = vec![
            block(1, 0.0, 0.1, "a"),
            block(2, 0.1, 0.2, "b"),
            block(3, 0.2, 0.3, "c"),
            block(4, 0.3, 0.9, "d"),
        ];
        let merged = merge_short_blocks(blocks, MIN_CAPTION_DURATION_SEC).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "a b c d");
        assert_eq!(merged[0].end_sec, 0.9);
        assert_eq!(merged[0].words.len(), 4);
    }

    #[test]
    fn test_trailing_short_block_flushes() {
        let blocks = vec![block(1, 0.0, 1.0, "long"), block(2, 1.0, 1.1, "tail")];
        let merged = merge_short_blocks(blocks, MIN_CAPTION_DURATION_SEC).unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].text, "tail");
        assert!(merged[1].duration() < MIN_CAPTION_DURATION_SEC);
    }

    #[test]
    fn test_merge_invariants() {
        let blocks = vec![
            block(1, 0.0, 0.3, "the"),
            block(2, 0.3, 0.45, "quick"),
            block(3, 0.45, 1.2, "brown"),
            block(4, 1.2, 1.4, "fox"),
            block(5, 1.4, 2.5, "jumps"),
        ];
        let input_text: Vec<String> = blocks.iter().map(|b| b.text.clone()).collect();

        let merged = merge_short_blocks(blocks, MIN_CAPTION_DURATION_SEC).unwrap();

        // Every block except possibly the last meets the minimum duration
        for block in &merged[..merged.len() - 1] {
            assert!(block.duration() >= MIN_CAPTION_DURATION_SEC);
        }

        // Concatenated text is preserved in order
        let merged_text = merged
            .iter()
            .map(|b| b.text.clone())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(merged_text, input_text.join(" "));
    }

    #[test]
    fn test_merged_raw_block_rebuilt() {
        let blocks = vec![block(1, 0.0, 0.2, "hi"), block(2, 0.2, 1.0, "there")];
        let merged = merge_short_blocks(blocks, MIN_CAPTION_DURATION_SEC).unwrap();

        assert_eq!(
            merged[0].raw_block,
            "1\n00:00:00,000 --> 00:00:01,000\nhi there"
        );
    }

    #[test]
    fn test_assemble_display_track() {
        let file_a = CaptionFile::new(
            "a.srt",
            "1\n00:00:00,000 --> 00:00:00,300\nhello\n\n2\n00:00:00,300 --> 00:00:01,200\nworld",
        );
        let file_b = CaptionFile::new(
            "b.srt",
            "1\n00:00:01,450 --> 00:00:02,500\ngoodbye",
        );

        let track = assemble_display_track(&[file_a, file_b], MIN_CAPTION_DURATION_SEC).unwrap();

        assert_eq!(track.len(), 2);
        assert_eq!(track[0].text, "hello world");
        assert_eq!(track[0].source_file_index, 0);
        assert_eq!(track[1].text, "goodbye");
        assert_eq!(track[1].source_file_index, 1);

        // Sorted by start time and non-overlapping
        for pair in track.windows(2) {
            assert!(pair[0].end_sec <= pair[1].start_sec);
        }
    }
}
