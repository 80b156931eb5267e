use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::TaskError;
use crate::models::{TaskStatus, TRASH_BUCKET};

pub const TASKS_DIR_NAME: &str = ".tasks";
pub const CONFIG_FILE: &str = "config.yaml";
pub const LOCK_FILE: &str = ".lock";
pub const BUCKETS: [&str; 4] = ["todo", "doing", "done", TRASH_BUCKET];

/// Handle on a tasks root directory. Every store function takes one of
/// these instead of reaching for a process-wide location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasksRoot {
    path: PathBuf,
}

impl TasksRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
        };
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.path.join(bucket)
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.bucket_dir(TRASH_BUCKET)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path.join(LOCK_FILE)
    }

    pub fn task_dir_path(&self, status: TaskStatus, created: NaiveDate, task_name: &str) -> PathBuf {
        self.bucket_dir(status.bucket())
            .join(make_task_dir_name(created, task_name))
    }

    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }
}

pub fn make_task_dir_name(created: NaiveDate, task_name: &str) -> String {
    format!("{}-{task_name}", created.format("%Y-%m-%d"))
}

/// Creates the four bucket directories. Safe to call repeatedly.
pub fn ensure_layout(root: &TasksRoot) -> Result<(), TaskError> {
    for bucket in BUCKETS {
        let dir = root.bucket_dir(bucket);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)?;
            tracing::debug!(path = %dir.display(), "created bucket directory");
        }
    }
    Ok(())
}

/// Find the enclosing git repository by walking up from `start`.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Every `.tasks` directory from `start` upward, nearest first.
pub fn discover_roots(start: &Path) -> Vec<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(TASKS_DIR_NAME))
        .filter(|candidate| candidate.is_dir())
        .collect()
}

/// Nearest tasks root at or above `start`, plus whether more than one was
/// found on the way up.
pub fn choose_root(start: &Path) -> (Option<TasksRoot>, bool) {
    let roots = discover_roots(start);
    let multiple = roots.len() > 1;
    (roots.into_iter().next().map(TasksRoot::new), multiple)
}

/// `<repo root>/.tasks` inside a git repository, `<start>/.tasks` otherwise.
pub fn default_init_root(start: &Path) -> TasksRoot {
    let base = find_repo_root(start).unwrap_or_else(|| start.to_path_buf());
    TasksRoot::new(base.join(TASKS_DIR_NAME))
}
