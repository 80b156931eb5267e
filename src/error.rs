use std::path::Path;

use thiserror::Error;

/// Broad failure category. Callers branch on this; `ErrorCode` is the
/// finer-grained machine-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    ValidationError,
    InvalidMetadata,
    CycleDetected,
    UnmetDependencies,
    TaskNotFound,
    AmbiguousRef,
    NameConflict,
    TargetExists,
    LockFailed,
    IoError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidMetadata => "INVALID_METADATA",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::UnmetDependencies => "UNMET_DEPENDENCIES",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::NameConflict => "NAME_CONFLICT",
            Self::TargetExists => "TARGET_EXISTS",
            Self::LockFailed => "LOCK_FAILED",
            Self::IoError => "IO_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized
            | Self::ValidationError
            | Self::InvalidMetadata
            | Self::CycleDetected
            | Self::UnmetDependencies => ErrorKind::Validation,
            Self::TaskNotFound => ErrorKind::NotFound,
            Self::AmbiguousRef | Self::NameConflict | Self::TargetExists | Self::LockFailed => {
                ErrorKind::Conflict
            }
            Self::IoError => ErrorKind::Io,
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct TaskError {
    pub code: ErrorCode,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, TaskError>;

impl TaskError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "No .tasks root found from current directory upward. Run `dot-tasks init` first.",
        )
    }

    pub fn root_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            format!("tasks root not found: {}", path.display()),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_metadata(path: &Path, detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidMetadata,
            format!("Invalid task metadata in {}: {detail}", path.display()),
        )
    }

    pub fn missing_keys(path: &Path, keys: &[&str]) -> Self {
        Self::new(
            ErrorCode::InvalidMetadata,
            format!(
                "Task metadata missing keys [{}] in {}",
                keys.join(", "),
                path.display()
            ),
        )
    }

    pub fn cycle_detected(path: &[String]) -> Self {
        Self::new(
            ErrorCode::CycleDetected,
            format!("Dependency cycle detected: {}", path.join(" -> ")),
        )
    }

    pub fn unmet_dependencies(ids: &[String]) -> Self {
        Self::new(
            ErrorCode::UnmetDependencies,
            format!(
                "Unmet dependencies: {}. Use --force to override.",
                ids.join(", ")
            ),
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {reference}"),
        )
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous task selector '{}': {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn name_conflict(name: &str) -> Self {
        Self::new(
            ErrorCode::NameConflict,
            format!("Task name already exists: {name}"),
        )
    }

    pub fn target_exists(path: &Path) -> Self {
        Self::new(
            ErrorCode::TargetExists,
            format!("Target task directory already exists: {}", path.display()),
        )
    }

    pub fn already_trashed(name: &str) -> Self {
        Self::new(
            ErrorCode::TargetExists,
            format!("Task is already in trash: {name}"),
        )
    }

    pub fn lock_failed(path: &Path) -> Self {
        Self::new(
            ErrorCode::LockFailed,
            format!(
                "Another dot-tasks process holds the lock at {}",
                path.display()
            ),
        )
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }
}

impl From<std::io::Error> for TaskError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}
