//! Task repository over a [`TaskStore`].

use crate::clock::{Clock, SystemClock};
use crate::model::id::TaskId;
use crate::model::task::{Task, TaskDraft};
use crate::model::validation::{validate, TaskCandidate, ValidationError};
use crate::store::kv::KeyValueStore;
use crate::store::task_store::TaskStore;
use crate::store::Recovered;
use log::{debug, info};
use std::collections::HashSet;

/// Outcome of a mutation: the applied value plus any persistence failure.
///
/// The mutation itself always stands; `error` only reports that the write
/// to storage did not happen.
pub type Saved<T> = Recovered<T>;

/// `Err` means the input was rejected and nothing changed.
pub type RepoResult<T> = Result<Saved<T>, ValidationError>;

/// Authoritative task collection with write-through persistence.
pub struct TaskRepository<S: KeyValueStore> {
    tasks: Vec<Task>,
    store: TaskStore<S>,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> TaskRepository<S> {
    /// Loads the stored collection using the system clock.
    pub fn load(store: TaskStore<S>) -> Recovered<Self> {
        Self::load_with_clock(store, Box::new(SystemClock))
    }

    /// Loads the stored collection; unreadable storage starts empty.
    pub fn load_with_clock(store: TaskStore<S>, clock: Box<dyn Clock>) -> Recovered<Self> {
        let (tasks, error) = store.load_tasks().into_parts();
        Recovered {
            value: Self {
                tasks,
                store,
                clock,
            },
            error,
        }
    }

    /// Creates a task from `draft` and appends it.
    ///
    /// # Errors
    /// Returns the validation messages when the draft is rejected; nothing
    /// is appended or stored.
    pub fn add(&mut self, draft: TaskDraft) -> RepoResult<Task> {
        let task = Task::from_draft(draft, self.clock.now());
        task.validate()?;

        self.tasks.push(task.clone());
        info!(
            "event=task_add module=repo status=ok priority={} has_due_date={}",
            task.priority,
            task.due_date.is_some()
        );
        Ok(self.persist(task))
    }

    /// Replaces the text of task `id`.
    ///
    /// Yields `None` without persisting when `id` is unknown. Only the
    /// text rules are re-checked; priority and due date are left as stored.
    pub fn update(&mut self, id: &str, new_text: &str) -> RepoResult<Option<Task>> {
        let now = self.clock.now();
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("event=task_update module=repo status=skipped reason=not_found");
            return Ok(Saved::ok(None));
        };

        validate(&TaskCandidate {
            text: Some(new_text),
            priority: Some(task.priority.as_str()),
        })
        .into_result()?;

        task.text = new_text.to_string();
        task.touch(now);
        let updated = task.clone();
        info!("event=task_update module=repo status=ok");
        Ok(self.persist(Some(updated)))
    }

    /// Flips `completed` on task `id`; `None` without persisting when unknown.
    pub fn toggle_completion(&mut self, id: &str) -> Saved<Option<Task>> {
        let now = self.clock.now();
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!("event=task_toggle module=repo status=skipped reason=not_found");
            return Saved::ok(None);
        };

        task.completed = !task.completed;
        task.touch(now);
        let toggled = task.clone();
        info!(
            "event=task_toggle module=repo status=ok completed={}",
            toggled.completed
        );
        self.persist(Some(toggled))
    }

    /// Removes task `id` if present. Persists either way.
    pub fn delete(&mut self, id: &str) -> Saved<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;
        info!("event=task_delete module=repo status=ok removed={removed}");
        self.persist(removed)
    }

    /// Removes every completed task and returns how many were removed.
    pub fn clear_completed(&mut self) -> Saved<usize> {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        info!("event=tasks_clear_completed module=repo status=ok removed={removed}");
        self.persist(removed)
    }

    /// Appends incoming tasks whose ids are not yet present, verbatim.
    ///
    /// Existing ids win; duplicates inside the batch keep the first
    /// occurrence. Persists once for the whole batch.
    pub fn import_merge(&mut self, incoming: Vec<Task>) -> Saved<usize> {
        let mut known = self
            .tasks
            .iter()
            .map(|task| task.id.clone())
            .collect::<HashSet<TaskId>>();
        let received = incoming.len();
        let mut appended = 0;

        for task in incoming {
            if known.insert(task.id.clone()) {
                self.tasks.push(task);
                appended += 1;
            }
        }

        info!(
            "event=tasks_import_merge module=repo status=ok received={received} appended={appended}"
        );
        self.persist(appended)
    }

    /// Independent copy of the collection in storage order.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Borrowed view of the collection for read-only derivations.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.iter().find(|task| task.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn persist<T>(&self, value: T) -> Saved<T> {
        match self.store.save_tasks(&self.tasks) {
            Ok(()) => Saved::ok(value),
            Err(err) => Saved::fallback(value, err),
        }
    }
}
