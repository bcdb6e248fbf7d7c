//! Task validator.
//!
//! # Invariants
//! - Every rule is evaluated; violations are collected in rule order.
//! - Validation is pure and deterministic.

use super::task::Priority;
use serde_json::Value;
use thiserror::Error;

/// Upper bound on task text length, counted in characters before trimming.
pub const MAX_TEXT_CHARS: usize = 500;

pub const TEXT_REQUIRED: &str = "Task text is required";
pub const TEXT_TOO_LONG: &str = "Task text is too long (max 500 characters)";
pub const INVALID_PRIORITY: &str = "Invalid priority level";

/// Loosely-typed view of the fields the validator inspects.
///
/// Imported records arrive as arbitrary JSON, so both fields may be missing
/// or carry values outside the typed domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCandidate<'a> {
    pub text: Option<&'a str>,
    pub priority: Option<&'a str>,
}

impl<'a> TaskCandidate<'a> {
    /// Reads `text` and `priority` from a raw JSON object.
    ///
    /// Non-string values are treated as missing.
    pub fn from_json(value: &'a Value) -> Self {
        Self {
            text: value.get("text").and_then(Value::as_str),
            priority: value.get("priority").and_then(Value::as_str),
        }
    }
}

/// Outcome of [`validate`]: an ordered list of violated rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Converts the report into a `Result`, keeping every message on failure.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                messages: self.errors,
            })
        }
    }
}

/// Rejected task content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join("; "))]
pub struct ValidationError {
    pub messages: Vec<String>,
}

impl ValidationError {
    /// The message surfaced to the user: the first violated rule.
    pub fn first_message(&self) -> &str {
        self.messages.first().map_or(TEXT_REQUIRED, String::as_str)
    }
}

/// Checks a candidate against the text and priority rules.
pub fn validate(candidate: &TaskCandidate<'_>) -> ValidationReport {
    let mut errors = Vec::new();

    if candidate.text.map_or(true, |text| text.trim().is_empty()) {
        errors.push(TEXT_REQUIRED.to_string());
    }

    if candidate
        .text
        .is_some_and(|text| text.chars().count() > MAX_TEXT_CHARS)
    {
        errors.push(TEXT_TOO_LONG.to_string());
    }

    if candidate
        .priority
        .and_then(|value| value.parse::<Priority>().ok())
        .is_none()
    {
        errors.push(INVALID_PRIORITY.to_string());
    }

    ValidationReport { errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate<'a>(text: Option<&'a str>, priority: Option<&'a str>) -> TaskCandidate<'a> {
        TaskCandidate { text, priority }
    }

    #[test]
    fn accepts_well_formed_candidate() {
        let report = validate(&candidate(Some("ok"), Some("low")));
        assert!(report.is_valid());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn whitespace_only_text_is_required_error() {
        let report = validate(&candidate(Some("   \t"), Some("medium")));
        assert_eq!(report.errors(), [TEXT_REQUIRED]);
    }

    #[test]
    fn length_is_measured_before_trimming() {
        let padded = format!("{}  ", "x".repeat(499));
        let report = validate(&candidate(Some(&padded), Some("high")));
        assert_eq!(report.errors(), [TEXT_TOO_LONG]);

        let exact = "y".repeat(MAX_TEXT_CHARS);
        assert!(validate(&candidate(Some(&exact), Some("high"))).is_valid());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_TEXT_CHARS);
        assert!(validate(&candidate(Some(&text), Some("low"))).is_valid());
    }

    #[test]
    fn collects_every_violation_in_rule_order() {
        let report = validate(&candidate(None, Some("urgent")));
        assert_eq!(report.errors(), [TEXT_REQUIRED, INVALID_PRIORITY]);

        let error = report.into_result().unwrap_err();
        assert_eq!(error.first_message(), TEXT_REQUIRED);
    }

    #[test]
    fn json_candidate_treats_non_strings_as_missing() {
        let value = json!({ "text": 42, "priority": null });
        let report = validate(&TaskCandidate::from_json(&value));
        assert_eq!(report.errors(), [TEXT_REQUIRED, INVALID_PRIORITY]);
    }
}
