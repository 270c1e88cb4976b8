//! SRT Timecode Codec
//!
//! Bidirectional conversion between caption timestamps (`HH:MM:SS,mmm`) and
//! floating-point seconds. Pure functions, no state.

use crate::{PipelineError, PipelineResult, TimeSec};

/// Parses an SRT timestamp (e.g. `00:01:23,456`) into seconds.
///
/// Fails with [`PipelineError::MalformedTimestamp`] when the input has fewer
/// than four components or any component is non-numeric.
pub fn parse_timestamp(ts: &str) -> PipelineResult<TimeSec> {
    let parts: Vec<&str> = ts.split([':', ',']).collect();
    if parts.len() < 4 {
        return Err(PipelineError::MalformedTimestamp(ts.to_string()));
    }

    let mut fields = [0u64; 4];
    for (field, part) in fields.iter_mut().zip(&parts) {
        *field = part
            .trim()
            .parse()
            .map_err(|_| PipelineError::MalformedTimestamp(ts.to_string()))?;
    }

    let [hours, minutes, seconds, millis] = fields;
    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0)
}

/// Formats seconds as an SRT timestamp (`00:00:00,000`).
///
/// Hours, minutes and seconds are floored; milliseconds round to the nearest
/// integer, clamped to 999 so a value like 0.9996 cannot spill into a fifth
/// digit. Round-trips with [`parse_timestamp`] within 1 ms for any
/// non-negative finite input; negative or non-finite input fails with
/// [`PipelineError::InvalidDuration`].
pub fn format_timestamp(seconds: TimeSec) -> PipelineResult<String> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(PipelineError::InvalidDuration(seconds));
    }

    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let millis = ((seconds % 1.0) * 1000.0).round().min(999.0) as u64;

    Ok(format!(
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, secs, millis
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Parsing Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:01,500").unwrap(), 1.5);
        assert_eq!(parse_timestamp("00:01:30,000").unwrap(), 90.0);
        assert_eq!(parse_timestamp("01:30:00,000").unwrap(), 5400.0);
        assert_eq!(parse_timestamp("00:00:00,100").unwrap(), 0.1);
    }

    #[test]
    fn test_parse_timestamp_too_few_components() {
        let result = parse_timestamp("00:00:01");
        assert!(matches!(
            result.unwrap_err(),
            PipelineError::MalformedTimestamp(_)
        ));
    }

    #[test]
    fn test_parse_timestamp_non_numeric() {
        for input in ["00:00:xx,000", "aa:00:00,000", "00:00:01,5b0"] {
            let result = parse_timestamp(input);
            assert!(
                matches!(result, Err(PipelineError::MalformedTimestamp(_))),
                "expected malformed-timestamp error for {:?}",
                input
            );
        }
    }

    // -------------------------------------------------------------------------
    // Formatting Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0).unwrap(), "00:00:00,000");
        assert_eq!(format_timestamp(1.5).unwrap(), "00:00:01,500");
        assert_eq!(format_timestamp(90.0).unwrap(), "00:01:30,000");
        assert_eq!(format_timestamp(5400.0).unwrap(), "01:30:00,000");
    }

    #[test]
    fn test_format_timestamp_clamps_millis() {
        // 0.9996 rounds to 1000ms; the field clamps rather than spilling over
        assert_eq!(format_timestamp(0.9996).unwrap(), "00:00:00,999");
        assert_eq!(format_timestamp(59.9999).unwrap(), "00:00:59,999");
    }

    #[test]
    fn test_format_timestamp_rejects_invalid() {
        assert!(matches!(
            format_timestamp(-0.001),
            Err(PipelineError::InvalidDuration(_))
        ));
        assert!(matches!(
            format_timestamp(f64::NAN),
            Err(PipelineError::InvalidDuration(_))
        ));
        assert!(matches!(
            format_timestamp(f64::INFINITY),
            Err(PipelineError::InvalidDuration(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Roundtrip Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_roundtrip_within_one_millisecond() {
        // Sweep the representable range, including awkward fractions
        let mut t = 0.0;
        while t < 359_999.999 {
            let formatted = format_timestamp(t).unwrap();
            let parsed = parse_timestamp(&formatted).unwrap();
            assert!(
                (parsed - t).abs() <= 0.001,
                "roundtrip drift for {}: formatted {} parsed {}",
                t,
                formatted,
                parsed
            );
            t += 3571.0007;
        }
    }

    #[test]
    fn test_roundtrip_edge_values() {
        for t in [0.0, 0.0004, 0.9996, 59.999, 3599.9996, 359_999.999] {
            let parsed = parse_timestamp(&format_timestamp(t).unwrap()).unwrap();
            assert!((parsed - t).abs() <= 0.001, "drift for {}", t);
        }
    }
}
