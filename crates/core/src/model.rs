use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A single trackable to-do item.
///
/// Field names serialize in camelCase (`createdAt` as an RFC 3339 string) so
/// the persisted payload stays readable and stable across versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh task from already-trimmed, non-empty text.
    pub(crate) fn new(text: String) -> Self {
        Self {
            id: Ulid::new().to_string(),
            text,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Named predicate narrowing the visible task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    /// Whether a task passes this filter.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(anyhow!(
                "Unknown filter '{}': expected all|active|completed",
                other
            )),
        }
    }
}

impl ValueEnum for Filter {
    fn value_variants<'a>() -> &'a [Self] {
        const VARIANTS: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];
        &VARIANTS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Result of a successful `add_task`.
#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub id: String,
    pub text: String,
}

/// Result of `toggle_task`; `changed == false` means the id was unknown.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub id: String,
    pub changed: bool,
}

/// Result of `delete_task`; deleting an unknown id reports `deleted == false`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub id: String,
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn filter_matches_by_completion() {
        let mut task = Task::new("write report".into());
        assert!(Filter::All.matches(&task));
        assert!(Filter::Active.matches(&task));
        assert!(!Filter::Completed.matches(&task));

        task.completed = true;
        assert!(Filter::All.matches(&task));
        assert!(!Filter::Active.matches(&task));
        assert!(Filter::Completed.matches(&task));
    }

    #[test]
    fn filter_round_trips_through_str() {
        for filter in [Filter::All, Filter::Active, Filter::Completed] {
            assert_eq!(filter.as_str().parse::<Filter>().unwrap(), filter);
        }
        assert!("soon".parse::<Filter>().is_err());
    }

    #[test]
    fn task_serializes_camel_case() {
        let task = Task::new("buy milk".into());
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("created_at"));
    }

    #[test]
    fn new_tasks_get_distinct_ids() {
        let a = Task::new("one".into());
        let b = Task::new("two".into());
        assert_ne!(a.id, b.id);
        assert!(!a.completed);
    }
}
