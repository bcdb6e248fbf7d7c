//! Search box input handling.
//!
//! Raw keystrokes go into a [`SearchDebouncer`]; the host loop calls
//! [`SearchInput::tick`] and the term reaches the manager only after the
//! quiet interval.

use super::debounce::SearchDebouncer;
use super::presenter::Presenter;
use super::task_manager::TaskManager;
use crate::store::kv::KeyValueStore;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    debouncer: SearchDebouncer,
}

impl SearchInput {
    pub fn new(quiet: Duration) -> Self {
        Self {
            debouncer: SearchDebouncer::new(quiet),
        }
    }

    /// Records the current contents of the search box.
    pub fn keystroke(&mut self, raw: &str, now: Instant) {
        self.debouncer.input(raw, now);
    }

    /// Clears the box immediately (escape key), bypassing the debounce.
    pub fn clear<S: KeyValueStore, P: Presenter>(&mut self, manager: &mut TaskManager<S, P>) {
        self.debouncer.cancel();
        manager.set_search_term("");
    }

    /// Applies the pending term if its quiet interval has elapsed.
    ///
    /// Returns `true` when the manager recomputed its view.
    pub fn tick<S: KeyValueStore, P: Presenter>(
        &mut self,
        manager: &mut TaskManager<S, P>,
        now: Instant,
    ) -> bool {
        match self.debouncer.poll(now) {
            Some(term) => {
                manager.set_search_term(&term);
                true
            }
            None => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }
}
