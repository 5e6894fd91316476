//! Timestamp arithmetic for durations.
//!
//! Timestamps stay opaque strings everywhere else; this is only used to
//! derive `duration_ms` when both ends parse.

use chrono::NaiveDateTime;

const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
    let ts = ts.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
}

/// Milliseconds from `start` to `end`; None if either side is not a timestamp.
pub fn duration_ms(start: &str, end: &str) -> Option<i64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Some((end - start).num_milliseconds())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_space_and_t_separators() {
        assert_eq!(
            duration_ms("2025-01-08 15:21:09.123", "2025-01-08 15:21:10.500"),
            Some(1377)
        );
        assert_eq!(
            duration_ms("2025-01-08T23:59:59", "2025-01-09T00:00:01.25"),
            Some(2250)
        );
    }

    #[test]
    fn opaque_timestamps_have_no_duration() {
        assert_eq!(duration_ms("t1", "t4"), None);
        assert_eq!(duration_ms("unknown", "2025-01-08 15:21:09"), None);
    }
}
