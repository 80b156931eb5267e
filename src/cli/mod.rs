pub mod commands;
pub mod init;
pub mod list;
pub mod task;

pub use commands::*;

use std::env;
use std::path::Path;

use serde_json::Value;

use crate::error::TaskError;
use crate::output;
use crate::service::TaskService;
use crate::store::{choose_root, TasksRoot};

/// Config warnings go to stderr so stdout stays parseable.
pub fn warn_config(message: &str) {
    eprintln!("Warning: {message}");
}

pub(crate) fn echo_root_notice(root: &TasksRoot, multiple: bool) {
    eprintln!("Using tasks root: {}", root.path().display());
    if multiple {
        eprintln!("Warning: multiple .tasks roots found; using nearest ancestor.");
    }
}

/// `--tasks-root` if given (it must exist), otherwise the nearest `.tasks`
/// above the current directory.
pub fn resolve_existing_root(root_flag: Option<&Path>) -> Result<TasksRoot, TaskError> {
    if let Some(path) = root_flag {
        let root = TasksRoot::new(path);
        if !root.exists() {
            return Err(TaskError::root_not_found(root.path()));
        }
        return Ok(root);
    }
    let cwd = env::current_dir()?;
    match choose_root(&cwd) {
        (Some(root), multiple) => {
            echo_root_notice(&root, multiple);
            Ok(root)
        }
        (None, _) => Err(TaskError::not_initialized()),
    }
}

pub fn open_service(root_flag: Option<&Path>) -> Result<TaskService, TaskError> {
    TaskService::open(resolve_existing_root(root_flag)?)
}

pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

/// Turns a runner result into the process exit code, reporting errors the
/// way the output mode expects.
pub fn finish(result: Result<i32, TaskError>, json_output: bool) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(code = e.code.as_str(), "command failed");
            if json_output {
                print_json(&output::json::error(&e));
            } else {
                eprintln!("Error: {}", e.message);
            }
            1
        }
    }
}
