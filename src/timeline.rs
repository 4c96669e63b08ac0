/// Hourly slot axis for one run.
///
/// A run classifies a fixed number of consecutive local hours starting at the
/// current hour. Slots are local wall-clock times (no offset attached)
/// because upstream hourly payloads are requested in the local timezone and
/// their `time` arrays carry no offset either.
///
/// # Clock injection
/// `build_slots_at` takes `now` as a parameter rather than calling
/// `Utc::now()` internally, so tests are deterministic without mocking.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, Timelike, Utc};

/// Returns `count` hourly slots in local time, starting at `now` truncated
/// to the hour.
///
/// An out-of-range `utc_offset_hours` falls back to UTC.
pub fn build_slots_at(now: DateTime<Utc>, utc_offset_hours: i32, count: usize) -> Vec<NaiveDateTime> {
    let offset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or(Utc.fix());
    let local = now.with_timezone(&offset).naive_local();
    let start = truncate_to_hour(local);
    (0..count)
        .map(|i| start + Duration::hours(i as i64))
        .collect()
}

/// Convenience wrapper that uses the real current time.
/// Use `build_slots_at` in tests to keep them deterministic.
pub fn build_slots(utc_offset_hours: i32, count: usize) -> Vec<NaiveDateTime> {
    build_slots_at(Utc::now(), utc_offset_hours, count)
}

fn truncate_to_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    /// A fixed "now" used across all tests: 2025-01-15 05:42:17 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 5, 42, 17).unwrap()
    }

    fn local(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_slots_start_at_truncated_local_hour() {
        // 05:42 UTC is 12:42 WIB (UTC+7); first slot is 12:00 local.
        let slots = build_slots_at(fixed_now(), 7, 24);
        assert_eq!(slots.len(), 24);
        assert_eq!(slots[0], local(15, 12));
        assert_eq!(slots[1], local(15, 13));
    }

    #[test]
    fn test_slots_cross_midnight() {
        let slots = build_slots_at(fixed_now(), 7, 24);
        assert_eq!(slots[11], local(15, 23));
        assert_eq!(slots[12], local(16, 0));
        assert_eq!(slots[23], local(16, 11));
    }

    #[test]
    fn test_zero_offset_is_utc() {
        let slots = build_slots_at(fixed_now(), 0, 3);
        assert_eq!(slots, vec![local(15, 5), local(15, 6), local(15, 7)]);
    }

    #[test]
    fn test_invalid_offset_falls_back_to_utc() {
        let slots = build_slots_at(fixed_now(), 99, 1);
        assert_eq!(slots[0], local(15, 5));
    }

    #[test]
    fn test_zero_count_is_empty() {
        assert!(build_slots_at(fixed_now(), 7, 0).is_empty());
    }
}
