//! Working-time arithmetic: elapsed minutes between two instants restricted
//! to a tenant's workdays and shift windows.
//!
//! The computation is pure and synchronous; callers resolve the calendar via
//! the provider seam and pass it in.

use crate::models::WorkingCalendar;
use chrono::{DateTime, Datelike, NaiveTime, Utc};

/// Elapsed working minutes between `start` and `end` under `calendar`.
///
/// `end = None` means "now" (live elapsed-time display for an item still in
/// progress). Returns 0 when `end <= start`. A day outside the configured
/// workdays contributes nothing; a workday contributes the positive overlap
/// of each shift window (anchored to that calendar day) with `[start, end]`.
/// A workday with no configured shifts counts in full (00:00-24:00).
/// Fractional minutes are truncated, not rounded.
pub fn working_minutes(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    calendar: &WorkingCalendar,
) -> i64 {
    working_minutes_with_policy(start, end, calendar, true)
}

/// Same as [`working_minutes`] with the empty-shift fallback made explicit.
/// With `whole_day_when_no_shifts = false`, a workday without shifts
/// contributes zero.
pub fn working_minutes_with_policy(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    calendar: &WorkingCalendar,
    whole_day_when_no_shifts: bool,
) -> i64 {
    let end = end.unwrap_or_else(Utc::now);
    if end <= start {
        return 0;
    }

    let midnight = NaiveTime::MIN;
    let mut total_seconds: i64 = 0;
    let mut day = start.date_naive();
    let last_day = end.date_naive();

    while day <= last_day {
        if calendar.is_workday(day.weekday()) {
            if calendar.shifts.is_empty() {
                if whole_day_when_no_shifts {
                    let day_start = day.and_time(midnight).and_utc();
                    let day_end = match day.succ_opt() {
                        Some(next) => next.and_time(midnight).and_utc(),
                        None => end,
                    };
                    total_seconds += overlap_seconds(day_start, day_end, start, end);
                }
            } else {
                for shift in &calendar.shifts {
                    let shift_start = day.and_time(shift.start).and_utc();
                    let shift_end = day.and_time(shift.end).and_utc();
                    total_seconds += overlap_seconds(shift_start, shift_end, start, end);
                }
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    total_seconds / 60
}

/// Parse-tolerant variant for raw RFC 3339 timestamp strings: any
/// unparseable input yields 0, matching the display contract.
pub fn working_minutes_str(start: &str, end: Option<&str>, calendar: &WorkingCalendar) -> i64 {
    let Ok(start) = DateTime::parse_from_rfc3339(start) else {
        return 0;
    };
    let end = match end {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(_) => return 0,
        },
        None => None,
    };
    working_minutes(start.with_timezone(&Utc), end, calendar)
}

fn overlap_seconds(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> i64 {
    let lo = window_start.max(start);
    let hi = window_end.min(end);
    if hi > lo {
        (hi - lo).num_seconds()
    } else {
        0
    }
}
