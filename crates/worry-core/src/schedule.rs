//! Cancellable delayed work.
//!
//! There is no background thread: a [`Debouncer`] only records a deadline,
//! and whoever owns the event loop polls it with the current time.

use chrono::{DateTime, TimeDelta, Utc};

/// Coalesces bursts of triggers into one run after a quiet interval.
///
/// Every [`schedule`](Self::schedule) cancels the pending run and starts the
/// interval again, so at most one run is ever pending.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: TimeDelta,
    deadline: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new(delay: TimeDelta) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> TimeDelta {
        self.delay
    }

    /// (Re)start the quiet interval from `now`. A deadline past the end of
    /// the calendar is due at once.
    pub fn schedule(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now.checked_add_signed(self.delay).unwrap_or(now));
    }

    /// Drop the pending run without running it.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// True exactly once when the deadline has been reached.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Take the pending run now. True when something was pending.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
