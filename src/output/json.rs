use std::collections::HashMap;

use serde_json::{json, Value};

use crate::error::TaskError;
use crate::models::{health_label, DependencyHealth, DependencyRow, Task, TaskMetadata};
use crate::service::{TagCount, TaskView};

pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data
    })
}

pub fn error(err: &TaskError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code.as_str(),
            "message": err.message
        }
    })
}

pub fn metadata_json(meta: &TaskMetadata) -> Value {
    serde_json::to_value(meta).unwrap_or(Value::Null)
}

pub fn task_summary(t: &Task) -> Value {
    json!({
        "task_id": t.metadata.task_id,
        "task_name": t.metadata.task_name,
        "status": t.metadata.status.as_str(),
        "path": t.dir.to_string_lossy()
    })
}

/// One list entry: the full header plus a health label and the directory.
pub fn task_list_entry(t: &Task, unmet: usize) -> Value {
    let mut v = metadata_json(&t.metadata);
    v["dependency_health"] = json!(health_label(unmet));
    v["path"] = json!(t.dir.to_string_lossy());
    v
}

pub fn task_list(tasks: &[Task], unmet_counts: &HashMap<String, usize>) -> Value {
    Value::Array(
        tasks
            .iter()
            .map(|t| task_list_entry(t, unmet_counts.get(&t.metadata.task_id).copied().unwrap_or(0)))
            .collect(),
    )
}

pub fn dependency_rows(rows: &[DependencyRow]) -> Value {
    serde_json::to_value(rows).unwrap_or(Value::Null)
}

pub fn health_json(health: &DependencyHealth) -> Value {
    json!({
        "label": health.label(),
        "unmet": dependency_rows(&health.unmet)
    })
}

pub fn task_detail(view: &TaskView) -> Value {
    json!({
        "metadata": metadata_json(&view.task.metadata),
        "dependencies": dependency_rows(&view.dependencies),
        "blocked_by": dependency_rows(&view.blocked_by),
        "dependency_health": health_json(&view.health),
        "body": view.task.body,
        "path": view.task.dir.to_string_lossy()
    })
}

pub fn tag_counts(rows: &[TagCount]) -> Value {
    serde_json::to_value(rows).unwrap_or(Value::Null)
}
