use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fields::{Effort, Priority, SpecReadiness, TaskStatus};
use crate::error::TaskError;

pub const TASK_FILE: &str = "task.md";
pub const ACTIVITY_FILE: &str = "activity.md";
pub const PLAN_FILE: &str = "plan.md";
pub const TRASH_BUCKET: &str = "trash";

/// Header keys in canonical render order.
pub const TASK_META_KEYS: [&str; 13] = [
    "task_id",
    "task_name",
    "status",
    "date_created",
    "date_started",
    "date_completed",
    "priority",
    "effort",
    "spec_readiness",
    "depends_on",
    "blocked_by",
    "owner",
    "tags",
];

/// Header keys with no default; a task file lacking any of them is rejected.
pub const REQUIRED_META_KEYS: [&str; 4] = ["task_id", "task_name", "status", "date_created"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    pub task_id: String,
    pub task_name: String,
    pub status: TaskStatus,
    pub date_created: NaiveDate,
    #[serde(default)]
    pub date_started: Option<NaiveDate>,
    #[serde(default)]
    pub date_completed: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub effort: Effort,
    #[serde(default)]
    pub spec_readiness: SpecReadiness,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub blocked_by: Vec<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TaskMetadata {
    pub fn new(task_id: String, task_name: String, date_created: NaiveDate) -> Self {
        Self {
            task_id,
            task_name,
            status: TaskStatus::Todo,
            date_created,
            date_started: None,
            date_completed: None,
            priority: Priority::default(),
            effort: Effort::default(),
            spec_readiness: SpecReadiness::default(),
            depends_on: Vec::new(),
            blocked_by: Vec::new(),
            owner: None,
            tags: Vec::new(),
        }
    }
}

/// A task as loaded from disk: header, markdown body and owning directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub metadata: TaskMetadata,
    pub body: String,
    pub dir: PathBuf,
}

impl Task {
    pub fn task_md_path(&self) -> PathBuf {
        self.dir.join(TASK_FILE)
    }

    pub fn activity_path(&self) -> PathBuf {
        self.dir.join(ACTIVITY_FILE)
    }

    pub fn plan_path(&self) -> PathBuf {
        self.dir.join(PLAN_FILE)
    }

    pub fn dir_name(&self) -> &str {
        self.dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn is_trashed(&self) -> bool {
        self.dir
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|bucket| bucket == TRASH_BUCKET)
    }

    pub fn id(&self) -> &str {
        &self.metadata.task_id
    }

    pub fn name(&self) -> &str {
        &self.metadata.task_name
    }
}

/// Task names are kebab-case: `^[a-z0-9]+(-[a-z0-9]+)*$`.
pub fn validate_task_name(name: &str) -> Result<(), TaskError> {
    let valid = !name.is_empty()
        && name
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    if !valid {
        return Err(TaskError::validation(
            "task_name must be kebab-case with lowercase letters, numbers, and hyphens",
        ));
    }
    Ok(())
}

/// Trims, drops blanks, dedups and sorts.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = tags
        .into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_kebab_case_names() {
        for name in ["a", "fix-login", "v2-api-3", "0"] {
            assert!(validate_task_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_non_kebab_names() {
        for name in ["", "Upper", "bad-", "-bad", "double--dash", "has space", "snake_case"] {
            assert!(validate_task_name(name).is_err(), "{name}");
        }
    }

    #[test]
    fn tags_are_trimmed_sorted_and_unique() {
        assert_eq!(
            normalize_tags([" ui", "api", "", "ui "]),
            vec!["api".to_string(), "ui".to_string()]
        );
    }

    #[test]
    fn trash_detection_uses_parent_bucket() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let meta = TaskMetadata::new("t-20260102-001".into(), "a".into(), date);
        let mut task = Task {
            metadata: meta,
            body: String::new(),
            dir: PathBuf::from("/r/.tasks/todo/2026-01-02-a"),
        };
        assert!(!task.is_trashed());
        task.dir = PathBuf::from("/r/.tasks/trash/2026-01-02-a");
        assert!(task.is_trashed());
        assert_eq!(task.dir_name(), "2026-01-02-a");
    }
}
