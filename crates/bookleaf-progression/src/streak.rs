//! Reading streak detection over UTC calendar days.
//!
//! A streak is a run of consecutive days, each with at least one session,
//! ending today. A run of two or more days earns the session streak bonus.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};

/// Consecutive days needed before the streak bonus applies.
pub const MIN_STREAK_DAYS: u32 = 2;

/// Length of the streak ending on `today`.
///
/// Returns 0 when there was no session today. Duplicate days are ignored.
pub fn current_streak(session_days: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = session_days.iter().copied().collect();

    let mut streak: u32 = 0;
    let mut cursor = today;
    while days.contains(&cursor) {
        streak = streak.saturating_add(1);
        let Some(previous) = cursor.pred_opt() else {
            break;
        };
        cursor = previous;
    }
    streak
}

/// Whether the reader is on a streak of at least [`MIN_STREAK_DAYS`].
pub fn has_reading_streak(session_days: &[NaiveDate], today: NaiveDate) -> bool {
    current_streak(session_days, today) >= MIN_STREAK_DAYS
}

/// UTC calendar days of the given session timestamps.
pub fn session_days_utc(timestamps: &[DateTime<Utc>]) -> Vec<NaiveDate> {
    timestamps.iter().map(DateTime::date_naive).collect()
}
