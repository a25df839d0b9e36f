//! Calendar math over raw unix timestamps. All display times are shifted by a
//! fixed configured offset; there is no DST handling.

/// Convert a count of days since Unix epoch to (year, month, day).
pub fn unix_days_to_date(days: i64) -> (i64, i64, i64) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m as i64, d as i64)
}

/// Format a timestamp as DD/MM/YYYY in the given UTC offset.
pub fn format_local_date(ts: i64, tz_offset: i32) -> String {
    let local_ts = ts + (tz_offset as i64) * 3600;
    let (y, m, d) = unix_days_to_date(local_ts.div_euclid(86400));
    format!("{d:02}/{m:02}/{y:04}")
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_first_of_january_1970() {
        assert_eq!(unix_days_to_date(0), (1970, 1, 1));
    }

    #[test]
    fn leap_day_2024() {
        // 2024-02-29 = 19782 days after epoch
        assert_eq!(unix_days_to_date(19782), (2024, 2, 29));
    }

    #[test]
    fn date_format_uses_local_offset() {
        // 1970-01-01 23:30 UTC is already Jan 2 at UTC+7
        let ts = 23 * 3600 + 30 * 60;
        assert_eq!(format_local_date(ts, 7), "02/01/1970");
        assert_eq!(format_local_date(ts, 0), "01/01/1970");
    }

    #[test]
    fn truncate_short_string_is_identity() {
        assert_eq!(truncate_chars("hello", 200), "hello");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "héllo wörld";
        assert_eq!(truncate_chars(s, 4), "héll");
        assert_eq!(truncate_chars(s, 4).chars().count(), 4);
    }
}
