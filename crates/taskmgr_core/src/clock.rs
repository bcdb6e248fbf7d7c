//! Time source used for task timestamps.
//!
//! Repository code never calls `Utc::now()` directly, so tests can pin or
//! step time explicitly.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
///
/// Clones share the same state, so a test can hand one copy to a repository
/// and keep another to move time forward. Each `now()` call advances the
/// clock by `step` after reading it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    step: Duration,
}

impl ManualClock {
    /// A clock frozen at `start`.
    pub fn fixed(start: DateTime<Utc>) -> Self {
        Self::stepping(start, Duration::zero())
    }

    /// A clock that advances by `step` on every read.
    pub fn stepping(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState { now: start, step })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.now += by;
    }

    pub fn set(&self, now: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.now = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = state.now;
        let step = state.step;
        state.now += step;
        current
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};
    use chrono::{DateTime, Duration, Utc};

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-13T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn stepping_clock_advances_after_each_read() {
        let clock = ManualClock::stepping(start(), Duration::seconds(2));

        assert_eq!(clock.now(), start());
        assert_eq!(clock.now(), start() + Duration::seconds(2));
        assert_eq!(clock.now(), start() + Duration::seconds(4));
    }

    #[test]
    fn clones_share_state_and_fixed_clock_stays_put() {
        let clock = ManualClock::fixed(start());
        let handle = clock.clone();

        assert_eq!(clock.now(), start());
        assert_eq!(clock.now(), start());

        handle.advance(Duration::minutes(5));
        assert_eq!(clock.now(), start() + Duration::minutes(5));

        handle.set(start());
        assert_eq!(clock.now(), start());
    }
}
