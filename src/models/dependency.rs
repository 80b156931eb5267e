use serde::{Deserialize, Serialize};

use super::task::Task;

pub const MISSING_TASK_NAME: &str = "missing";
pub const UNKNOWN_STATUS: &str = "unknown";

/// One `(task_name, task_id, status)` row describing an edge endpoint.
/// Ids that no longer resolve to an active task come back as
/// `("missing", id, "unknown")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRow {
    pub task_name: String,
    pub task_id: String,
    pub status: String,
}

impl DependencyRow {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_name: task.metadata.task_name.clone(),
            task_id: task.metadata.task_id.clone(),
            status: task.metadata.status.as_str().to_string(),
        }
    }

    pub fn missing(task_id: &str) -> Self {
        Self {
            task_name: MISSING_TASK_NAME.to_string(),
            task_id: task_id.to_string(),
            status: UNKNOWN_STATUS.to_string(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.task_name == MISSING_TASK_NAME && self.status == UNKNOWN_STATUS
    }
}

/// Dependencies of one task that are missing or not yet completed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyHealth {
    pub unmet: Vec<DependencyRow>,
}

impl DependencyHealth {
    pub fn count(&self) -> usize {
        self.unmet.len()
    }

    pub fn is_healthy(&self) -> bool {
        self.unmet.is_empty()
    }

    pub fn label(&self) -> String {
        health_label(self.count())
    }
}

/// `ready`, or `blocked(N)` for `N` unmet dependencies.
pub fn health_label(unmet: usize) -> String {
    if unmet == 0 {
        "ready".to_string()
    } else {
        format!("blocked({unmet})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_label_matches_unmet_count() {
        assert_eq!(health_label(0), "ready");
        assert_eq!(health_label(3), "blocked(3)");

        let health = DependencyHealth {
            unmet: vec![DependencyRow::missing("t-20260101-001")],
        };
        assert_eq!(health.label(), health_label(health.count()));
        assert_eq!(DependencyHealth::default().label(), "ready");
    }
}
