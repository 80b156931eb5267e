//! Whole-collection revalidation run before every persist.

use std::collections::{BTreeMap, HashMap, HashSet};

use super::cycle::detect_cycle;
use crate::error::TaskError;
use crate::models::Task;

/// Checks the active collection and repairs its derived fields in place.
///
/// `depends_on` is deduplicated and sorted, and `blocked_by` is rebuilt from
/// scratch as the transpose of the dependency edges. Ids listed in `trashed`
/// may be referenced without error; they stay in `depends_on` but take no
/// part in cycle detection or `blocked_by`.
///
/// Enumerated fields need no check here: they are typed and cannot hold an
/// out-of-set value once decoded.
pub fn validate_graph(tasks: &mut [Task], trashed: &HashSet<String>) -> Result<(), TaskError> {
    let mut ids: HashSet<String> = HashSet::new();
    let mut names: HashSet<String> = HashSet::new();
    for task in tasks.iter() {
        if !ids.insert(task.metadata.task_id.clone()) {
            return Err(TaskError::validation(format!(
                "Duplicate task_id found: {}",
                task.metadata.task_id
            )));
        }
        if !names.insert(task.metadata.task_name.clone()) {
            return Err(TaskError::validation(format!(
                "Duplicate task_name found: {}",
                task.metadata.task_name
            )));
        }
    }

    let mut nodes: Vec<String> = Vec::with_capacity(tasks.len());
    let mut edges: Vec<(String, String)> = Vec::new();
    for task in tasks.iter_mut() {
        let meta = &mut task.metadata;
        meta.depends_on.sort();
        meta.depends_on.dedup();
        for dep_id in &meta.depends_on {
            if *dep_id == meta.task_id {
                return Err(TaskError::validation(format!(
                    "Task {} cannot depend on itself",
                    meta.task_name
                )));
            }
            if ids.contains(dep_id) {
                edges.push((meta.task_id.clone(), dep_id.clone()));
            } else if !trashed.contains(dep_id) {
                return Err(TaskError::validation(format!(
                    "Task {} has unknown dependency {dep_id}",
                    meta.task_name
                )));
            }
        }
        nodes.push(meta.task_id.clone());
    }

    detect_cycle(&nodes, &edges)?;

    let mut blocked_by: HashMap<&str, Vec<String>> = HashMap::new();
    for (task_id, dep_id) in &edges {
        blocked_by.entry(dep_id.as_str()).or_default().push(task_id.clone());
    }
    let mut blocked_by: BTreeMap<String, Vec<String>> = blocked_by
        .into_iter()
        .map(|(id, mut dependents)| {
            dependents.sort();
            (id.to_string(), dependents)
        })
        .collect();
    for task in tasks.iter_mut() {
        task.metadata.blocked_by = blocked_by.remove(&task.metadata.task_id).unwrap_or_default();
    }
    Ok(())
}
