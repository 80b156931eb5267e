use super::TaskService;
use crate::error::TaskError;
use crate::models::{
    normalize_tags, validate_task_name, DependencyHealth, DependencyRow, Effort, Priority, Task,
    TaskMetadata, TaskStatus,
};
use crate::store::activity::{self, ActivityKind, DEFAULT_ACTOR};
use crate::store::task_repo;

const UNKNOWN_ACTOR: &str = "unknown";

/// Input for [`TaskService::create`].
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub summary: String,
    pub priority: Priority,
    pub effort: Effort,
    pub owner: Option<String>,
    pub tags: Vec<String>,
    pub depends_on: Vec<String>,
}

impl NewTask {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Field changes for [`TaskService::update`]. `None` and empty lists leave
/// the field alone unless the matching replace flag is set.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub priority: Option<Priority>,
    pub effort: Option<Effort>,
    /// `Some("")` clears the owner.
    pub owner: Option<String>,
    pub tags: Vec<String>,
    pub replace_tags: bool,
    pub depends_on: Vec<String>,
    pub clear_depends_on: bool,
    pub note: Option<String>,
}

/// A task together with both directions of its dependency edges.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub task: Task,
    pub dependencies: Vec<DependencyRow>,
    pub blocked_by: Vec<DependencyRow>,
    pub health: DependencyHealth,
}

fn initial_body(summary: &str) -> String {
    let summary = summary.trim();
    let summary = if summary.is_empty() { "TODO" } else { summary };
    format!("## Summary\n- {summary}\n\n## Acceptance Criteria\n- TODO\n")
}

impl TaskService {
    pub fn create(&self, new: NewTask) -> Result<Task, TaskError> {
        validate_task_name(&new.name)?;
        let _lock = self.lock()?;
        self.ensure_unique_task_name(&new.name, None)?;

        let today = self.today();
        let task_id = task_repo::next_task_id(&self.root, today)?;
        let dep_ids = self.resolve_dependency_refs(&new.depends_on)?;

        let mut metadata = TaskMetadata::new(task_id.clone(), new.name.clone(), today);
        metadata.priority = new.priority;
        metadata.effort = new.effort;
        metadata.owner = new.owner.filter(|owner| !owner.trim().is_empty());
        metadata.tags = normalize_tags(&new.tags);
        metadata.depends_on = dep_ids;

        let task = Task {
            metadata,
            body: initial_body(&new.summary),
            dir: self.root.task_dir_path(TaskStatus::Todo, today, &new.name),
        };
        if task.dir.exists() {
            return Err(TaskError::target_exists(&task.dir));
        }

        let mut hypothetical = self.all_active()?;
        hypothetical.push(task.clone());
        self.validate_snapshot(&mut hypothetical)?;

        task_repo::write_task(&task)?;
        activity::touch(&task)?;
        activity::append_activity(
            &task,
            DEFAULT_ACTOR,
            ActivityKind::Create,
            &format!("Task created ({task_id})"),
            self.now(),
        )?;
        tracing::debug!(%task_id, name = %task.metadata.task_name, "created task");

        self.validate_and_persist_all()?;
        self.find_by_selector(&task_id, false)
    }

    pub fn start(&self, selector: &str, force: bool) -> Result<Task, TaskError> {
        let _lock = self.lock()?;
        let mut task = self.find_by_selector(selector, false)?;
        if task.metadata.status == TaskStatus::Completed {
            return Err(TaskError::validation("Cannot start a completed task"));
        }

        let unmet: Vec<String> = self
            .dependency_health(&task)?
            .unmet
            .into_iter()
            .map(|row| row.task_id)
            .collect();
        if !unmet.is_empty() && !force {
            return Err(TaskError::unmet_dependencies(&unmet));
        }

        if task.metadata.date_started.is_none() {
            task.metadata.date_started = Some(self.today());
        }
        task.metadata.status = TaskStatus::Doing;
        task.metadata.date_completed = None;

        task_repo::move_task_dir(&self.root, &mut task, TaskStatus::Doing, None)?;
        task_repo::write_task(&task)?;
        task_repo::write_plan_if_missing(&task)?;
        activity::append_activity(&task, DEFAULT_ACTOR, ActivityKind::Plan, "Task started", self.now())?;

        self.validate_and_persist_all()?;
        self.find_by_selector(&task.metadata.task_id, false)
    }

    /// Returns the task unchanged when it is already completed.
    pub fn complete(&self, selector: &str) -> Result<Task, TaskError> {
        let _lock = self.lock()?;
        let mut task = self.find_by_selector(selector, false)?;
        if task.metadata.status == TaskStatus::Completed {
            return Ok(task);
        }

        self.validate_and_persist_all()?;

        task.metadata.status = TaskStatus::Completed;
        task.metadata.date_completed = Some(self.today());
        if task.metadata.date_started.is_none() {
            task.metadata.date_started = Some(task.metadata.date_created);
        }

        task_repo::move_task_dir(&self.root, &mut task, TaskStatus::Completed, None)?;
        task_repo::write_task(&task)?;
        activity::append_activity(
            &task,
            DEFAULT_ACTOR,
            ActivityKind::Complete,
            "Task marked completed",
            self.now(),
        )?;

        self.validate_and_persist_all()?;
        self.find_by_selector(&task.metadata.task_id, false)
    }

    pub fn update(&self, selector: &str, changes: TaskUpdate) -> Result<Task, TaskError> {
        let _lock = self.lock()?;
        let mut task = self.find_by_selector(selector, false)?;
        let meta = &mut task.metadata;

        if let Some(priority) = changes.priority {
            meta.priority = priority;
        }
        if let Some(effort) = changes.effort {
            meta.effort = effort;
        }
        if let Some(owner) = changes.owner {
            let owner = owner.trim();
            meta.owner = (!owner.is_empty()).then(|| owner.to_string());
        }

        if changes.replace_tags {
            meta.tags = normalize_tags(&changes.tags);
        } else if !changes.tags.is_empty() {
            meta.tags = normalize_tags(meta.tags.iter().chain(changes.tags.iter()));
        }

        if changes.clear_depends_on {
            meta.depends_on.clear();
        }
        if !changes.depends_on.is_empty() {
            let dep_ids = self.resolve_dependency_refs(&changes.depends_on)?;
            meta.depends_on.extend(dep_ids);
            meta.depends_on.sort();
            meta.depends_on.dedup();
        }

        let mut snapshot = self.snapshot_with(&task)?;
        self.validate_and_persist_snapshot(&mut snapshot)?;

        let note = changes
            .note
            .as_deref()
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .unwrap_or("Task metadata updated");
        activity::append_activity(&task, DEFAULT_ACTOR, ActivityKind::Update, note, self.now())?;
        self.find_by_selector(&task.metadata.task_id, false)
    }

    /// Appends a free-form `update` line. A blank actor is recorded as
    /// `unknown`.
    pub fn log_activity(&self, selector: &str, note: &str, actor: &str) -> Result<Task, TaskError> {
        let _lock = self.lock()?;
        let task = self.find_by_selector(selector, false)?;

        let note = note.trim();
        if note.is_empty() {
            return Err(TaskError::validation("note is required"));
        }
        let actor = match actor.trim() {
            "" => UNKNOWN_ACTOR,
            actor => actor,
        };
        activity::append_activity(&task, actor, ActivityKind::Update, note, self.now())?;
        Ok(task)
    }

    /// Renames in place; the id is kept so dependents stay valid untouched.
    pub fn rename(&self, selector: &str, new_name: &str) -> Result<Task, TaskError> {
        validate_task_name(new_name)?;
        let _lock = self.lock()?;
        let mut task = self.find_by_selector(selector, false)?;
        self.ensure_unique_task_name(new_name, Some(&task.metadata.task_id))?;

        let status = task.metadata.status;
        task_repo::move_task_dir(&self.root, &mut task, status, Some(new_name))?;
        task.metadata.task_name = new_name.to_string();
        task_repo::write_task(&task)?;
        activity::append_activity(
            &task,
            DEFAULT_ACTOR,
            ActivityKind::Update,
            &format!("Task renamed to {new_name}"),
            self.now(),
        )?;

        self.validate_and_persist_all()?;
        self.find_by_selector(&task.metadata.task_id, false)
    }

    /// Soft delete moves the task into trash without revalidating the graph;
    /// hard delete removes its directory outright.
    pub fn delete(&self, selector: &str, hard: bool) -> Result<Task, TaskError> {
        let _lock = self.lock()?;
        let mut task = self.find_by_selector(selector, true)?;
        if hard {
            task_repo::hard_delete(&task.dir)?;
            return Ok(task);
        }
        if task.is_trashed() {
            return Err(TaskError::already_trashed(&task.metadata.task_name));
        }

        activity::append_activity(
            &task,
            DEFAULT_ACTOR,
            ActivityKind::Update,
            "Task moved to trash",
            self.now(),
        )?;
        task_repo::move_to_trash(&self.root, &mut task)?;
        Ok(task)
    }

    pub fn view(&self, selector: &str) -> Result<TaskView, TaskError> {
        let task = self.find_by_selector(selector, false)?;
        Ok(TaskView {
            dependencies: self.dependency_rows(&task)?,
            blocked_by: self.blocked_by_rows(&task)?,
            health: self.dependency_health(&task)?,
            task,
        })
    }
}
