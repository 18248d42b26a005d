//! The once-per-day progress rule.
//!
//! Pure functions of `(progress, last_viewed, now)`; the store applies the
//! outcome, nothing here touches storage.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Step added to a word's progress by one successful review.
pub const PROGRESS_STEP: u8 = 5;

/// Upper bound for a word's progress.
pub const PROGRESS_MAX: u8 = 100;

/// Local calendar date of an instant, time of day stripped.
pub fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Whether two instants fall on the same local calendar day.
///
/// Midnight-aligned comparison, not a rolling 24-hour window: 23:59 and
/// 00:01 the next day count as different days.
pub fn same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    local_date(a) == local_date(b)
}

/// Decide a review attempt at `now`.
///
/// Returns the new progress value, or `None` when the word was already
/// reviewed on `now`'s calendar day.
pub fn review(progress: u8, last_viewed: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<u8> {
    if let Some(last) = last_viewed {
        if same_calendar_day(last, now) {
            return None;
        }
    }
    Some(progress.saturating_add(PROGRESS_STEP).min(PROGRESS_MAX))
}
