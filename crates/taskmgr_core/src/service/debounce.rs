//! Restart-on-input timer used to debounce search keystrokes.
//!
//! The debouncer is a plain state machine driven by caller-supplied
//! instants, so the host event loop decides when to poll it.

use std::time::{Duration, Instant};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    term: String,
    due_at: Instant,
}

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    pending: Option<Pending>,
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEBOUNCE)
    }
}

impl SearchDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Schedules `term`, replacing and restarting any pending one.
    pub fn input(&mut self, term: impl Into<String>, now: Instant) {
        self.pending = Some(Pending {
            term: term.into(),
            due_at: now + self.quiet,
        });
    }

    /// Drops the pending term, returning it if there was one.
    pub fn cancel(&mut self) -> Option<String> {
        self.pending.take().map(|pending| pending.term)
    }

    /// When the pending term will fire, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due_at)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fires the pending term once the quiet interval has elapsed.
    ///
    /// Returns `Some` at most once per scheduled term.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due_at = self.deadline()?;
        if now >= due_at {
            self.cancel()
        } else {
            None
        }
    }
}
