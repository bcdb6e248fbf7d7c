use chrono::{DateTime, Duration, NaiveDate, Utc};
use taskmgr_core::{parse_due_date, Priority, Task, TaskDraft};

fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

#[test]
fn from_draft_applies_defaults_and_equal_timestamps() {
    let now = at("2026-02-13T10:00:00Z");
    let task = Task::from_draft(TaskDraft::new("Buy milk"), now);

    assert!(!task.id.is_empty());
    assert_eq!(task.text, "Buy milk");
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.due_date, None);
    assert!(!task.completed);
    assert_eq!(task.created_at, now);
    assert_eq!(task.updated_at, task.created_at);
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let now = at("2026-02-13T10:00:00Z");
    let due = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let task = Task::from_draft(
        TaskDraft::new("Ship release")
            .with_priority(Priority::High)
            .with_due_date(due),
        now,
    );

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], task.id.as_str());
    assert_eq!(json["text"], "Ship release");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["dueDate"], "2026-03-01");
    assert_eq!(json["completed"], false);
    assert!(json["createdAt"].as_str().unwrap().starts_with("2026-02-13T10:00:00"));
    assert!(json.get("updatedAt").is_some());

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn legacy_records_decode_with_medium_priority_and_no_due_date() {
    let value = serde_json::json!({
        "id": "lx3k9a2b",
        "text": "old schema",
        "completed": true,
        "createdAt": "2024-01-01T08:30:00.000Z",
        "updatedAt": "2024-01-02T08:30:00.000Z"
    });

    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.due_date, None);
    assert!(task.completed);
}

#[test]
fn null_priority_and_blank_due_date_are_upgraded() {
    let value = serde_json::json!({
        "id": "a",
        "text": "blank inputs",
        "priority": null,
        "dueDate": "",
        "completed": false,
        "createdAt": "2024-01-01T08:30:00.000Z",
        "updatedAt": "2024-01-01T08:30:00.000Z"
    });

    let task: Task = serde_json::from_value(value).unwrap();
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.due_date, None);
}

#[test]
fn unusable_priority_and_due_date_values_read_as_defaults() {
    for (priority, due) in [
        (serde_json::json!(""), serde_json::json!("next week")),
        (serde_json::json!("urgent"), serde_json::json!(20260301)),
    ] {
        let value = serde_json::json!({
            "id": "a",
            "text": "free-form input",
            "priority": priority,
            "dueDate": due,
            "createdAt": "2024-01-01T08:30:00.000Z",
            "updatedAt": "2024-01-01T08:30:00.000Z"
        });

        let task: Task = serde_json::from_value(value).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.due_date, None);
        assert!(!task.completed);
    }
}

#[test]
fn touch_never_moves_updated_at_before_created_at() {
    let created = at("2026-02-13T10:00:00Z");
    let mut task = Task::from_draft(TaskDraft::new("skew"), created);

    task.touch(created - Duration::hours(1));
    assert_eq!(task.updated_at, created);

    task.touch(created + Duration::minutes(5));
    assert_eq!(task.updated_at, created + Duration::minutes(5));
}

#[test]
fn validate_reports_text_rules() {
    let mut task = Task::from_draft(TaskDraft::new("  "), Utc::now());
    let err = task.validate().unwrap_err();
    assert_eq!(err.first_message(), "Task text is required");

    task.text = "x".repeat(501);
    let err = task.validate().unwrap_err();
    assert_eq!(
        err.messages,
        vec!["Task text is too long (max 500 characters)".to_string()]
    );
}

#[test]
fn parse_due_date_accepts_date_and_timestamp_forms() {
    let expected = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
    assert_eq!(parse_due_date("2099-01-01").unwrap(), expected);
    assert_eq!(parse_due_date("2099-01-01T00:00:00Z").unwrap(), expected);
    assert!(parse_due_date("next week").is_err());
}

#[test]
fn priority_labels_parse_and_weigh() {
    assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
    assert!("urgent".parse::<Priority>().is_err());
    assert!(Priority::High.weight() > Priority::Medium.weight());
    assert!(Priority::Medium.weight() > Priority::Low.weight());
}
