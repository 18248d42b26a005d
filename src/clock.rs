use chrono::{DateTime, Utc};

/// Source of "now" for anything that stamps or compares wall-clock time.
///
/// Injected rather than read ambiently so the calendar-day gate is
/// deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
