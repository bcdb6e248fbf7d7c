//! Terminal rendering of views, statistics and notifications.

use taskmgr_core::{Presenter, Severity, Task, TaskStatistics};

/// Keeps the latest view and prints notifications as they arrive.
///
/// Views are printed on demand, since every refresh would otherwise repeat
/// the list.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    visible: Vec<Task>,
    statistics: TaskStatistics,
}

impl ConsolePresenter {
    pub fn print_view(&self) {
        if self.visible.is_empty() {
            println!("(no tasks)");
            return;
        }
        for task in &self.visible {
            println!("{}", format_row(task));
        }
    }

    pub fn print_statistics(&self) {
        let stats = self.statistics;
        println!(
            "total={} active={} completed={} high_priority={}",
            stats.total, stats.active, stats.completed, stats.high_priority
        );
    }
}

impl Presenter for ConsolePresenter {
    fn render(&mut self, visible: &[Task]) {
        self.visible = visible.to_vec();
    }

    fn render_statistics(&mut self, stats: TaskStatistics) {
        self.statistics = stats;
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        eprintln!("[{}] {message}", severity.as_str());
    }
}

fn format_row(task: &Task) -> String {
    let check = if task.completed { "x" } else { " " };
    let due = task
        .due_date
        .map(|date| format!(" due {}", date.format("%Y-%m-%d")))
        .unwrap_or_default();
    format!(
        "[{check}] {:<6} {}{due}  ({})",
        task.priority.as_str(),
        task.text,
        task.id
    )
}

#[cfg(test)]
mod tests {
    use super::format_row;
    use taskmgr_core::{Clock, Priority, SystemClock, Task, TaskDraft};

    #[test]
    fn row_shows_state_priority_and_id() {
        let mut task = Task::from_draft(
            TaskDraft::new("Buy milk").with_priority(Priority::High),
            SystemClock.now(),
        );
        task.id = "abc".to_string();
        task.completed = true;

        assert_eq!(format_row(&task), "[x] high   Buy milk  (abc)");
    }
}
