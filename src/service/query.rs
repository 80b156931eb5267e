use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::TaskService;
use crate::error::TaskError;
use crate::models::{normalize_tags, DependencyHealth, DependencyRow, Task, TaskStatus};

pub const UNTAGGED_LABEL: &str = "(untagged)";

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<TaskStatus>,
    pub include_trash: bool,
    /// Match any of these tags, or all of them with `require_all_tags`.
    pub tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub require_all_tags: bool,
    pub untagged_only: bool,
}

impl ListFilter {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn matches(&self, task: &Task, include: &[String], exclude: &[String]) -> bool {
        let tags = &task.metadata.tags;
        if self.status.is_some_and(|status| task.metadata.status != status) {
            return false;
        }
        if self.untagged_only && !tags.is_empty() {
            return false;
        }
        if !include.is_empty() {
            let matched = if self.require_all_tags {
                include.iter().all(|tag| tags.contains(tag))
            } else {
                include.iter().any(|tag| tags.contains(tag))
            };
            if !matched {
                return false;
            }
        }
        !exclude.iter().any(|tag| tags.contains(tag))
    }
}

/// Per-tag totals with a status breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub total: usize,
    pub todo: usize,
    pub doing: usize,
    pub done: usize,
}

impl TagCount {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            total: 0,
            todo: 0,
            doing: 0,
            done: 0,
        }
    }

    fn add(&mut self, status: TaskStatus) {
        self.total += 1;
        match status {
            TaskStatus::Todo => self.todo += 1,
            TaskStatus::Doing => self.doing += 1,
            TaskStatus::Completed => self.done += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagSort {
    /// Highest total first, ties by tag.
    #[default]
    Count,
    Name,
}

impl TagSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Name => "name",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "count" => Some(Self::Count),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    /// Orders `rows` in place, then truncates to `limit` if given.
    pub fn apply(&self, rows: &mut Vec<TagCount>, limit: Option<usize>) {
        match self {
            Self::Count => rows.sort_by(|a, b| (Reverse(a.total), &a.tag).cmp(&(Reverse(b.total), &b.tag))),
            Self::Name => rows.sort_by(|a, b| a.tag.cmp(&b.tag)),
        }
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
    }
}

fn health_in(task: &Task, by_id: &HashMap<&str, &Task>) -> DependencyHealth {
    let unmet = task
        .metadata
        .depends_on
        .iter()
        .filter_map(|dep_id| match by_id.get(dep_id.as_str()) {
            None => Some(DependencyRow::missing(dep_id)),
            Some(dep) if dep.metadata.status != TaskStatus::Completed => Some(DependencyRow::for_task(dep)),
            Some(_) => None,
        })
        .collect();
    DependencyHealth { unmet }
}

fn rows_in(ids: &[String], by_id: &HashMap<&str, &Task>) -> Vec<DependencyRow> {
    ids.iter()
        .map(|id| match by_id.get(id.as_str()) {
            Some(task) => DependencyRow::for_task(task),
            None => DependencyRow::missing(id),
        })
        .collect()
}

fn index(tasks: &[Task]) -> HashMap<&str, &Task> {
    tasks
        .iter()
        .map(|task| (task.metadata.task_id.as_str(), task))
        .collect()
}

impl TaskService {
    /// Filtered tasks ordered by status, priority, creation date and name.
    pub fn list_tasks(&self, filter: &ListFilter) -> Result<Vec<Task>, TaskError> {
        let include = normalize_tags(&filter.tags);
        let exclude = normalize_tags(&filter.exclude_tags);
        let mut tasks: Vec<Task> = self
            .load(filter.include_trash)?
            .into_iter()
            .filter(|task| filter.matches(task, &include, &exclude))
            .collect();
        tasks.sort_by(|a, b| {
            let key = |t: &Task| {
                (
                    t.metadata.status,
                    t.metadata.priority,
                    t.metadata.date_created,
                    t.metadata.task_name.clone(),
                )
            };
            key(a).cmp(&key(b))
        });
        Ok(tasks)
    }

    /// Tag rows in tag order. Untagged tasks are counted under
    /// [`UNTAGGED_LABEL`] when `include_untagged` is set.
    pub fn tag_counts(
        &self,
        status: Option<TaskStatus>,
        include_untagged: bool,
    ) -> Result<Vec<TagCount>, TaskError> {
        let filter = ListFilter {
            status,
            ..ListFilter::default()
        };
        let mut counts: BTreeMap<String, TagCount> = BTreeMap::new();
        for task in self.list_tasks(&filter)? {
            let mut tags = normalize_tags(&task.metadata.tags);
            if tags.is_empty() {
                if !include_untagged {
                    continue;
                }
                tags.push(UNTAGGED_LABEL.to_string());
            }
            for tag in tags {
                counts
                    .entry(tag.clone())
                    .or_insert_with(|| TagCount::new(&tag))
                    .add(task.metadata.status);
            }
        }
        Ok(counts.into_values().collect())
    }

    /// Dependencies that are missing from the active set or not completed.
    pub fn dependency_health(&self, task: &Task) -> Result<DependencyHealth, TaskError> {
        let tasks = self.all_active()?;
        Ok(health_in(task, &index(&tasks)))
    }

    /// Unmet dependency count per task id, for every active task.
    pub fn unmet_counts(&self) -> Result<HashMap<String, usize>, TaskError> {
        let tasks = self.all_active()?;
        let by_id = index(&tasks);
        Ok(tasks
            .iter()
            .map(|task| (task.metadata.task_id.clone(), health_in(task, &by_id).count()))
            .collect())
    }

    pub fn dependency_rows(&self, task: &Task) -> Result<Vec<DependencyRow>, TaskError> {
        let tasks = self.all_active()?;
        Ok(rows_in(&task.metadata.depends_on, &index(&tasks)))
    }

    pub fn blocked_by_rows(&self, task: &Task) -> Result<Vec<DependencyRow>, TaskError> {
        let tasks = self.all_active()?;
        Ok(rows_in(&task.metadata.blocked_by, &index(&tasks)))
    }
}
