use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use super::layout::{make_task_dir_name, TasksRoot};
use crate::error::TaskError;
use crate::frontmatter;
use crate::models::{Task, TaskStatus, TASK_FILE, TRASH_BUCKET};

const ID_PREFIX: &str = "t-";

const PLAN_TEMPLATE: &str = "## Plan\n\
1. Confirm scope and success criteria\n\
2. Implement incrementally\n\
3. Validate with tests/checks\n\
4. Update activity and complete\n";

/// Task directories (children of a bucket holding a `task.md`), bucket by
/// bucket in lexical order.
pub fn iter_task_dirs(root: &TasksRoot, include_trash: bool) -> Result<Vec<PathBuf>, TaskError> {
    let mut buckets: Vec<&str> = TaskStatus::ALL.iter().map(TaskStatus::bucket).collect();
    if include_trash {
        buckets.push(TRASH_BUCKET);
    }

    let mut dirs = Vec::new();
    for bucket in buckets {
        let bucket_dir = root.bucket_dir(bucket);
        if !bucket_dir.is_dir() {
            continue;
        }
        let mut children: Vec<PathBuf> = fs::read_dir(&bucket_dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        children.sort();
        dirs.extend(
            children
                .into_iter()
                .filter(|child| child.is_dir() && child.join(TASK_FILE).is_file()),
        );
    }
    Ok(dirs)
}

/// Loads every task. The containing bucket overrides whatever `status` the
/// header claims.
pub fn load_tasks(root: &TasksRoot, include_trash: bool) -> Result<Vec<Task>, TaskError> {
    let mut tasks = Vec::new();
    for dir in iter_task_dirs(root, include_trash)? {
        let bucket_status = dir
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .and_then(TaskStatus::from_bucket);
        tasks.push(frontmatter::parse_task(&dir, bucket_status)?);
    }
    Ok(tasks)
}

/// Next free id for `created`: `t-YYYYMMDD-NNN`, one past the highest
/// sequence used that day by any task, trashed ones included.
pub fn next_task_id(root: &TasksRoot, created: NaiveDate) -> Result<String, TaskError> {
    let prefix = format!("{ID_PREFIX}{}-", created.format("%Y%m%d"));
    let max_seq = load_tasks(root, true)?
        .iter()
        .filter_map(|task| task.metadata.task_id.strip_prefix(prefix.as_str()))
        .filter_map(|seq| seq.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let next = max_seq.checked_add(1).ok_or_else(|| {
        TaskError::validation(format!("Task id sequence exhausted for {prefix}*"))
    })?;
    let id = format!("{prefix}{next:03}");
    tracing::debug!(%id, "allocated task id");
    Ok(id)
}

/// Writes `task.md`, creating the directory if needed. The file is written
/// and synced beside the target, then renamed into place.
pub fn write_task(task: &Task) -> Result<(), TaskError> {
    fs::create_dir_all(&task.dir)?;
    let path = task.task_md_path();
    let text = frontmatter::render_metadata(&task.metadata, &task.body)
        .map_err(|e| TaskError::invalid_metadata(&path, e))?;
    let tmp = task.dir.join(format!("{TASK_FILE}.tmp"));
    let mut file = File::create(&tmp)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, &path)?;
    Ok(())
}

/// Moves the task directory to match `(target_status, created, name)` and
/// updates `task.dir`. No-op when already in place.
pub fn move_task_dir(
    root: &TasksRoot,
    task: &mut Task,
    target_status: TaskStatus,
    target_name: Option<&str>,
) -> Result<(), TaskError> {
    let name = target_name.unwrap_or(&task.metadata.task_name);
    let target = root.task_dir_path(target_status, task.metadata.date_created, name);
    if target == task.dir {
        return Ok(());
    }
    if target.exists() {
        return Err(TaskError::target_exists(&target));
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(&task.dir, &target)?;
    tracing::debug!(from = %task.dir.display(), to = %target.display(), "moved task directory");
    task.dir = target;
    Ok(())
}

/// Trash destination for `task`; a `-HHMMSS` suffix is added when the plain
/// name is taken.
pub fn unique_trash_path(root: &TasksRoot, task: &Task) -> Result<PathBuf, TaskError> {
    let trash = root.trash_dir();
    fs::create_dir_all(&trash)?;
    let base = make_task_dir_name(task.metadata.date_created, &task.metadata.task_name);
    let candidate = trash.join(&base);
    if !candidate.exists() {
        return Ok(candidate);
    }
    let suffix = Local::now().format("%H%M%S");
    Ok(trash.join(format!("{base}-{suffix}")))
}

pub fn move_to_trash(root: &TasksRoot, task: &mut Task) -> Result<(), TaskError> {
    let target = unique_trash_path(root, task)?;
    if target.exists() {
        return Err(TaskError::target_exists(&target));
    }
    fs::rename(&task.dir, &target)?;
    tracing::debug!(to = %target.display(), "moved task to trash");
    task.dir = target;
    Ok(())
}

/// Removes the directory tree. Missing paths are fine.
pub fn hard_delete(path: &Path) -> Result<(), TaskError> {
    if path.exists() {
        fs::remove_dir_all(path)?;
        tracing::debug!(path = %path.display(), "hard deleted task directory");
    }
    Ok(())
}

/// Writes the default `plan.md` unless one exists. Returns whether it wrote.
pub fn write_plan_if_missing(task: &Task) -> Result<bool, TaskError> {
    let path = task.plan_path();
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, PLAN_TEMPLATE)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskMetadata;
    use crate::store::layout::ensure_layout;
    use tempfile::TempDir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
    }

    fn setup() -> (TempDir, TasksRoot) {
        let tmp = TempDir::new().unwrap();
        let root = TasksRoot::new(tmp.path().join(".tasks"));
        ensure_layout(&root).unwrap();
        (tmp, root)
    }

    fn put(root: &TasksRoot, id: &str, name: &str, status: TaskStatus) -> Task {
        let mut metadata = TaskMetadata::new(id.into(), name.into(), date());
        metadata.status = status;
        let task = Task {
            metadata,
            body: "body\n".into(),
            dir: root.task_dir_path(status, date(), name),
        };
        write_task(&task).unwrap();
        task
    }

    #[test]
    fn load_orders_by_bucket_then_name() {
        let (_tmp, root) = setup();
        put(&root, "t-20260214-002", "zeta", TaskStatus::Todo);
        put(&root, "t-20260214-001", "alpha", TaskStatus::Todo);
        put(&root, "t-20260214-003", "beta", TaskStatus::Completed);
        fs::create_dir_all(root.bucket_dir("todo").join("not-a-task")).unwrap();

        let names: Vec<String> = load_tasks(&root, false)
            .unwrap()
            .into_iter()
            .map(|t| t.metadata.task_name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta", "beta"]);
    }

    #[test]
    fn bucket_overrides_header_status() {
        let (_tmp, root) = setup();
        let mut task = put(&root, "t-20260214-001", "alpha", TaskStatus::Todo);
        task.metadata.status = TaskStatus::Completed;
        write_task(&task).unwrap();

        let loaded = load_tasks(&root, false).unwrap();
        assert_eq!(loaded[0].metadata.status, TaskStatus::Todo);
    }

    #[test]
    fn bucket_overrides_out_of_set_header_status() {
        let (_tmp, root) = setup();
        let task = put(&root, "t-20260214-001", "alpha", TaskStatus::Todo);
        let path = task.task_md_path();
        let text = fs::read_to_string(&path).unwrap().replace("status: todo", "status: done");
        fs::write(&path, text).unwrap();

        let loaded = load_tasks(&root, false).unwrap();
        assert_eq!(loaded[0].metadata.status, TaskStatus::Todo);

        write_task(&loaded[0]).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("status: todo"));
        assert!(!task.dir.join(format!("{TASK_FILE}.tmp")).exists());
    }

    #[test]
    fn next_id_rejects_exhausted_sequence() {
        let (_tmp, root) = setup();
        put(&root, "t-20260214-4294967295", "huge", TaskStatus::Todo);

        let err = next_task_id(&root, date()).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
    }

    #[test]
    fn next_id_counts_trash_and_ignores_other_days() {
        let (_tmp, root) = setup();
        assert_eq!(next_task_id(&root, date()).unwrap(), "t-20260214-001");

        let mut trashed = put(&root, "t-20260214-007", "gone", TaskStatus::Todo);
        move_to_trash(&root, &mut trashed).unwrap();
        put(&root, "t-20260213-042", "yesterday", TaskStatus::Todo);

        assert_eq!(next_task_id(&root, date()).unwrap(), "t-20260214-008");
        assert_eq!(next_task_id(&root, date()).unwrap(), "t-20260214-008");
    }

    #[test]
    fn move_is_noop_in_place_and_conflicts_on_existing_target() {
        let (_tmp, root) = setup();
        let mut task = put(&root, "t-20260214-001", "alpha", TaskStatus::Todo);
        let before = task.dir.clone();
        move_task_dir(&root, &mut task, TaskStatus::Todo, None).unwrap();
        assert_eq!(task.dir, before);

        put(&root, "t-20260214-002", "beta", TaskStatus::Doing);
        let err = move_task_dir(&root, &mut task, TaskStatus::Doing, Some("beta")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::TargetExists);
        assert!(before.is_dir());

        move_task_dir(&root, &mut task, TaskStatus::Doing, None).unwrap();
        assert!(!before.exists());
        assert_eq!(task.dir, root.task_dir_path(TaskStatus::Doing, date(), "alpha"));
        assert!(task.task_md_path().is_file());
    }

    #[test]
    fn trash_collisions_get_a_time_suffix() {
        let (_tmp, root) = setup();
        let mut first = put(&root, "t-20260214-001", "alpha", TaskStatus::Todo);
        move_to_trash(&root, &mut first).unwrap();
        assert_eq!(first.dir, root.trash_dir().join("2026-02-14-alpha"));

        let second = put(&root, "t-20260214-002", "alpha", TaskStatus::Doing);
        let path = unique_trash_path(&root, &second).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("2026-02-14-alpha-"), "{name}");
        assert_eq!(name.len(), "2026-02-14-alpha-".len() + 6);
    }

    #[test]
    fn plan_template_is_written_once() {
        let (_tmp, root) = setup();
        let task = put(&root, "t-20260214-001", "alpha", TaskStatus::Doing);
        assert!(write_plan_if_missing(&task).unwrap());
        fs::write(task.plan_path(), "my plan").unwrap();
        assert!(!write_plan_if_missing(&task).unwrap());
        assert_eq!(fs::read_to_string(task.plan_path()).unwrap(), "my plan");
    }

    #[test]
    fn hard_delete_removes_tree() {
        let (_tmp, root) = setup();
        let task = put(&root, "t-20260214-001", "alpha", TaskStatus::Todo);
        hard_delete(&task.dir).unwrap();
        assert!(!task.dir.exists());
        hard_delete(&task.dir).unwrap();
    }
}
