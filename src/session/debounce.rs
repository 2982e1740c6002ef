//! Cancellable debounce timer for the source-text input.
//!
//! Holds at most one pending value; scheduling replaces it and restarts
//! the quiet interval. Time is passed in by the caller, so expiry is
//! checked without sleeping — the event loop sleeps on `deadline()`,
//! tests just advance an `Instant`.

use std::time::{Duration, Instant};

/// One-slot debounce timer.
#[derive(Debug)]
pub struct DebounceTimer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
}

impl DebounceTimer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Schedule a value, replacing any pending one and restarting the
    /// quiet interval from `now`.
    pub fn schedule(&mut self, value: String, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    /// Drop the pending value, if any.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// When the pending value settles, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the pending value if its quiet interval has elapsed.
    pub fn take_expired(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Take the pending value immediately, expired or not.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(value, _)| value)
    }
}
