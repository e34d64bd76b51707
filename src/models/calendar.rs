use crate::error::ShopfloorError;
use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One shift window within a workday, anchored to the calendar day.
/// Split shifts are modeled as multiple non-overlapping windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftWindow {
    /// Parse a window from `"HH:MM"` boundary strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ShopfloorError> {
        let start = parse_hhmm(start)?;
        let end = parse_hhmm(end)?;
        if end <= start {
            return Err(ShopfloorError::CalendarConfigInvalid {
                reason: format!("shift end {end} is not after start {start}"),
            });
        }
        Ok(Self { start, end })
    }
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, ShopfloorError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| ShopfloorError::CalendarConfigInvalid {
        reason: format!("unparseable shift time {value:?}: {e}"),
    })
}

/// Per-tenant workday and shift configuration. Pure configuration, read-only
/// to the scheduling core.
///
/// `workdays` holds ISO weekday numbers (1 = Monday .. 7 = Sunday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingCalendar {
    pub workdays: BTreeSet<u8>,
    pub shifts: Vec<ShiftWindow>,
}

impl WorkingCalendar {
    pub fn new(workdays: impl IntoIterator<Item = u8>, shifts: Vec<ShiftWindow>) -> Self {
        Self {
            workdays: workdays.into_iter().collect(),
            shifts,
        }
    }

    /// Build a calendar from `"HH:MM"` shift boundary pairs.
    ///
    /// Windows that fail to parse are dropped with a warning rather than
    /// failing the caller; if none survive, the whole-day fallback policy
    /// applies on workdays.
    pub fn from_shift_strings(
        workdays: impl IntoIterator<Item = u8>,
        shifts: &[(&str, &str)],
    ) -> Self {
        let mut parsed = Vec::with_capacity(shifts.len());
        for (start, end) in shifts {
            match ShiftWindow::parse(start, end) {
                Ok(window) => parsed.push(window),
                Err(e) => {
                    tracing::warn!(shift_start = start, shift_end = end, error = %e,
                        "Dropping malformed shift window");
                }
            }
        }
        Self::new(workdays, parsed)
    }

    /// Monday-through-friday, single shift. Common tenant default.
    pub fn weekdays_with_shift(window: ShiftWindow) -> Self {
        Self::new(1..=5, vec![window])
    }

    pub fn is_workday(&self, weekday: Weekday) -> bool {
        self.workdays
            .contains(&(weekday.number_from_monday() as u8))
    }

    /// Validate the configuration, surfacing the first problem found.
    pub fn validate(&self) -> Result<(), ShopfloorError> {
        if let Some(bad) = self.workdays.iter().find(|d| **d < 1 || **d > 7) {
            return Err(ShopfloorError::CalendarConfigInvalid {
                reason: format!("workday number {bad} outside 1..=7"),
            });
        }
        for window in &self.shifts {
            if window.end <= window.start {
                return Err(ShopfloorError::CalendarConfigInvalid {
                    reason: format!(
                        "shift end {} is not after start {}",
                        window.end, window.start
                    ),
                });
            }
        }
        Ok(())
    }
}
