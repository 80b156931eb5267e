//! Task Lifecycle Service.
//!
//! Every operation loads the full collection from disk, applies one change,
//! runs [`validate_graph`] over the result and only then persists.

mod lifecycle;
mod query;

pub use lifecycle::{NewTask, TaskUpdate, TaskView};
pub use query::{ListFilter, TagCount, TagSort, UNTAGGED_LABEL};

use std::collections::HashSet;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::TaskError;
use crate::graph::validate_graph;
use crate::models::Task;
use crate::store::lock::MutationLock;
use crate::store::{ensure_layout, task_repo, TasksRoot};

pub struct TaskService {
    root: TasksRoot,
    fixed_date: Option<NaiveDate>,
}

impl TaskService {
    pub fn new(root: TasksRoot) -> Self {
        Self {
            root,
            fixed_date: None,
        }
    }

    /// Creates the bucket layout if needed and returns a service bound to it.
    pub fn open(root: TasksRoot) -> Result<Self, TaskError> {
        let service = Self::new(root);
        service.ensure_layout()?;
        Ok(service)
    }

    /// Pins "today" for date stamps and id allocation.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    pub fn root(&self) -> &TasksRoot {
        &self.root
    }

    pub fn ensure_layout(&self) -> Result<(), TaskError> {
        ensure_layout(&self.root)
    }

    pub fn next_task_id(&self) -> Result<String, TaskError> {
        task_repo::next_task_id(&self.root, self.today())
    }

    fn today(&self) -> NaiveDate {
        self.fixed_date.unwrap_or_else(|| Local::now().date_naive())
    }

    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        match self.fixed_date {
            Some(date) => date.and_time(now.time()),
            None => now,
        }
    }

    fn lock(&self) -> Result<MutationLock, TaskError> {
        MutationLock::acquire(&self.root)
    }

    fn load(&self, include_trash: bool) -> Result<Vec<Task>, TaskError> {
        task_repo::load_tasks(&self.root, include_trash)
    }

    pub fn all_active(&self) -> Result<Vec<Task>, TaskError> {
        self.load(false)
    }

    /// Resolves a task name, task id or directory name to exactly one task.
    pub fn find_by_selector(&self, selector: &str, include_trash: bool) -> Result<Task, TaskError> {
        let selector = selector.trim();
        let mut matches: Vec<Task> = self
            .load(include_trash)?
            .into_iter()
            .filter(|task| {
                task.metadata.task_name == selector
                    || task.metadata.task_id == selector
                    || task.dir_name() == selector
            })
            .collect();
        match matches.len() {
            0 => Err(TaskError::task_not_found(selector)),
            1 => Ok(matches.remove(0)),
            _ => {
                let names: Vec<String> = matches.into_iter().map(|t| t.metadata.task_name).collect();
                Err(TaskError::ambiguous_ref(selector, &names))
            }
        }
    }

    fn ensure_unique_task_name(&self, task_name: &str, ignore_task_id: Option<&str>) -> Result<(), TaskError> {
        let taken = self.load(true)?.iter().any(|task| {
            task.metadata.task_name == task_name && Some(task.metadata.task_id.as_str()) != ignore_task_id
        });
        if taken {
            return Err(TaskError::name_conflict(task_name));
        }
        Ok(())
    }

    /// Active task ids for each reference, sorted and deduplicated. Blank
    /// references are skipped.
    fn resolve_dependency_refs<S: AsRef<str>>(&self, refs: &[S]) -> Result<Vec<String>, TaskError> {
        let mut resolved = Vec::new();
        for reference in refs {
            let token = reference.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            resolved.push(self.find_by_selector(token, false)?.metadata.task_id);
        }
        resolved.sort();
        resolved.dedup();
        Ok(resolved)
    }

    fn trashed_ids(&self) -> Result<HashSet<String>, TaskError> {
        Ok(self
            .load(true)?
            .into_iter()
            .filter(Task::is_trashed)
            .map(|task| task.metadata.task_id)
            .collect())
    }

    /// The active collection with `updated` swapped in (or appended).
    fn snapshot_with(&self, updated: &Task) -> Result<Vec<Task>, TaskError> {
        let mut tasks = self.all_active()?;
        match tasks
            .iter_mut()
            .find(|task| task.metadata.task_id == updated.metadata.task_id)
        {
            Some(slot) => *slot = updated.clone(),
            None => tasks.push(updated.clone()),
        }
        Ok(tasks)
    }

    fn validate_snapshot(&self, tasks: &mut [Task]) -> Result<(), TaskError> {
        validate_graph(tasks, &self.trashed_ids()?)
    }

    fn validate_and_persist_snapshot(&self, tasks: &mut [Task]) -> Result<(), TaskError> {
        self.validate_snapshot(tasks)?;
        for task in tasks.iter() {
            task_repo::write_task(task)?;
        }
        Ok(())
    }

    fn validate_and_persist_all(&self) -> Result<(), TaskError> {
        let mut tasks = self.all_active()?;
        self.validate_and_persist_snapshot(&mut tasks)
    }
}
