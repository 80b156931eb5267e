//! dot-tasks: a task tracker that keeps each task as a markdown file inside a
//! status bucket directory (`todo/`, `doing/`, `done/`, `trash/`).
//!
//! Every mutation reloads the whole collection, applies one change, and
//! revalidates the dependency graph before anything is persisted.

pub mod cli;
pub mod error;
pub mod frontmatter;
pub mod graph;
pub mod models;
pub mod output;
pub mod service;
pub mod store;

pub use error::{ErrorCode, ErrorKind, TaskError};
pub use models::{Effort, Priority, SpecReadiness, Task, TaskMetadata, TaskStatus};
pub use service::TaskService;
