//! User settings record.
//!
//! Stored settings are merged over [`Settings::default`] key by key: a key
//! that is missing, or whose value cannot be read, keeps its default.

use super::ParseLabelError;
use crate::query::SortBy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(ParseLabelError::new("theme", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub theme: Theme,
    pub sort_by: SortBy,
    pub items_per_page: u32,
    pub show_completed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            sort_by: SortBy::Date,
            items_per_page: 10,
            show_completed: true,
        }
    }
}

impl Settings {
    /// Overlays every readable key of a stored object onto the defaults.
    ///
    /// Returns the merged settings and the names of known keys whose values
    /// were rejected. Unknown keys are ignored.
    pub fn merge_stored(stored: &Map<String, Value>) -> (Self, Vec<String>) {
        let mut settings = Self::default();
        let mut rejected = Vec::new();

        for (key, value) in stored {
            let applied = match key.as_str() {
                "theme" => overlay(value, &mut settings.theme),
                "sortBy" => overlay(value, &mut settings.sort_by),
                "itemsPerPage" => overlay(value, &mut settings.items_per_page),
                "showCompleted" => overlay(value, &mut settings.show_completed),
                _ => true,
            };
            if !applied {
                rejected.push(key.clone());
            }
        }

        (settings, rejected)
    }
}

fn overlay<T: DeserializeOwned>(value: &Value, slot: &mut T) -> bool {
    match T::deserialize(value) {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{Settings, Theme};
    use crate::query::SortBy;
    use serde_json::json;

    #[test]
    fn partial_object_is_merged_over_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.sort_by, SortBy::Date);
        assert_eq!(settings.items_per_page, 10);
        assert!(settings.show_completed);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let settings = Settings {
            sort_by: SortBy::DueDate,
            ..Settings::default()
        };
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["sortBy"], "dueDate");
        assert_eq!(value["itemsPerPage"], 10);
        assert_eq!(value["showCompleted"], true);
    }

    #[test]
    fn invalid_values_fall_back_per_key() {
        let stored = json!({
            "theme": "dark",
            "sortBy": "title",
            "itemsPerPage": -3,
            "showCompleted": false,
            "density": "compact"
        });
        let (settings, mut rejected) = Settings::merge_stored(stored.as_object().unwrap());

        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.sort_by, SortBy::Date);
        assert_eq!(settings.items_per_page, 10);
        assert!(!settings.show_completed);
        rejected.sort();
        assert_eq!(rejected, ["itemsPerPage", "sortBy"]);
    }
}
