//! Presentation-layer contract consumed by the core.
//!
//! The core owns no UI state; it only pushes views, statistics and
//! notifications through this trait.

use crate::model::task::Task;
use crate::query::TaskStatistics;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

pub trait Presenter {
    fn render(&mut self, visible: &[Task]);
    fn render_statistics(&mut self, stats: TaskStatistics);
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Presenter that keeps what it was given, for tests and non-visual hosts.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub visible: Vec<Task>,
    pub statistics: TaskStatistics,
    pub notifications: Vec<(String, Severity)>,
    pub render_count: usize,
}

impl RecordingPresenter {
    pub fn last_notification(&self) -> Option<(&str, Severity)> {
        self.notifications
            .last()
            .map(|(message, severity)| (message.as_str(), *severity))
    }

    /// Drains recorded notifications.
    pub fn take_notifications(&mut self) -> Vec<(String, Severity)> {
        std::mem::take(&mut self.notifications)
    }
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, visible: &[Task]) {
        self.visible = visible.to_vec();
        self.render_count += 1;
    }

    fn render_statistics(&mut self, stats: TaskStatistics) {
        self.statistics = stats;
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifications.push((message.to_string(), severity));
    }
}
