//! Task file codec: a YAML header between `---` lines, then a markdown body.
//!
//! ```text
//! ---
//! task_id: t-20260105-001
//! task_name: fix-login
//! status: todo
//! ...
//! ---
//!
//! ## Summary
//! - Fix the login redirect
//! ```
//!
//! The blank line after the closing delimiter is part of the format, not the
//! body, so `split(render(fields, body))` returns the body unchanged apart
//! from trailing-newline normalisation.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::TaskError;
use crate::models::{Task, TaskMetadata, TaskStatus, REQUIRED_META_KEYS, TASK_FILE, TASK_META_KEYS};

const OPEN: &str = "---\n";
const CLOSE: &str = "\n---\n";

/// Splits a task file into its header mapping and body.
///
/// Text that does not open with the delimiter, or never closes it, is all
/// body with an empty header.
pub fn split(text: &str) -> Result<(Mapping, String), serde_yaml::Error> {
    let Some(rest) = text.strip_prefix(OPEN) else {
        return Ok((Mapping::new(), text.to_string()));
    };

    let (raw, body) = if let Some(body) = rest.strip_prefix("---\n") {
        ("", body)
    } else {
        match rest.find(CLOSE) {
            Some(end) => (&rest[..end], &rest[end + CLOSE.len()..]),
            None => return Ok((Mapping::new(), text.to_string())),
        }
    };

    let header = match serde_yaml::from_str::<Value>(raw)? {
        Value::Mapping(map) => map,
        _ => Mapping::new(),
    };
    let body = body.strip_prefix('\n').unwrap_or(body);
    Ok((header, body.to_string()))
}

/// Renders `fields` in canonical key order (unknown keys are dropped),
/// followed by the body with exactly one trailing newline.
pub fn render(fields: &Mapping, body: &str) -> Result<String, serde_yaml::Error> {
    let mut ordered = Mapping::new();
    for key in TASK_META_KEYS {
        if let Some(value) = fields.get(key) {
            ordered.insert(Value::from(key), value.clone());
        }
    }
    let dumped = serde_yaml::to_string(&ordered)?;
    let body = body.trim_end();
    Ok(format!("{OPEN}{}{CLOSE}\n{body}\n", dumped.trim_end()))
}

pub fn render_metadata(metadata: &TaskMetadata, body: &str) -> Result<String, serde_yaml::Error> {
    let fields = match serde_yaml::to_value(metadata)? {
        Value::Mapping(map) => map,
        _ => Mapping::new(),
    };
    render(&fields, body)
}

/// Decodes a header mapping into metadata. Declared fields that are absent
/// fall back to their defaults; absent fields without a default are reported
/// together.
pub fn decode_metadata(header: &Mapping, path: &Path) -> Result<TaskMetadata, TaskError> {
    let missing: Vec<&str> = REQUIRED_META_KEYS
        .iter()
        .copied()
        .filter(|key| !header.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(TaskError::missing_keys(path, &missing));
    }

    let mut declared = Mapping::new();
    for key in TASK_META_KEYS {
        if let Some(value) = header.get(key) {
            declared.insert(Value::from(key), value.clone());
        }
    }
    serde_yaml::from_value(Value::Mapping(declared))
        .map_err(|e| TaskError::invalid_metadata(path, e))
}

/// Reads `<task_dir>/task.md` into a [`Task`].
///
/// `status` replaces whatever the header says before decoding, so a
/// hand-edited status never makes the file unreadable.
pub fn parse_task(task_dir: &Path, status: Option<TaskStatus>) -> Result<Task, TaskError> {
    let task_md = task_dir.join(TASK_FILE);
    let text = fs::read_to_string(&task_md)?;
    let (mut header, body) = split(&text).map_err(|e| TaskError::invalid_metadata(&task_md, e))?;
    if let Some(status) = status {
        header.insert(Value::from("status"), Value::from(status.as_str()));
    }
    let metadata = decode_metadata(&header, &task_md)?;
    Ok(Task {
        metadata,
        body,
        dir: task_dir.to_path_buf(),
    })
}
