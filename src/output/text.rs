//! Plain-text renderers. Every function returns the rendered block; the CLI
//! decides where it goes.

use std::collections::HashMap;
use std::fs;

use crate::models::{health_label, DependencyRow, Task};
use crate::service::{TagCount, TaskView};
use crate::store::config::ListColumn;

const ELLIPSIS: char = '…';

/// Cuts `value` to `width` characters, marking the cut with an ellipsis.
pub fn truncate(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len <= width {
        return value.to_string();
    }
    match width {
        0 => String::new(),
        1 => ELLIPSIS.to_string(),
        _ => {
            let mut out: String = value.chars().take(width - 1).collect();
            out.push(ELLIPSIS);
            out
        }
    }
}

fn cell(value: &str, width: usize) -> String {
    format!("{:<width$}", truncate(value, width))
}

fn column_value(task: &Task, column: &str, unmet: usize) -> String {
    let meta = &task.metadata;
    match column {
        "task_name" => meta.task_name.clone(),
        "task_id" => meta.task_id.clone(),
        "status" => meta.status.as_str().to_string(),
        "priority" => meta.priority.as_str().to_string(),
        "effort" => meta.effort.as_str().to_string(),
        "spec_readiness" => meta.spec_readiness.as_str().to_string(),
        "deps" => health_label(unmet),
        "created" => meta.date_created.format("%Y-%m-%d").to_string(),
        _ => String::new(),
    }
}

pub fn render_task_list(
    tasks: &[Task],
    unmet_counts: &HashMap<String, usize>,
    columns: &[ListColumn],
) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }
    let widths: Vec<usize> = columns.iter().map(|c| c.width as usize).collect();

    let mut lines = Vec::with_capacity(tasks.len() + 2);
    lines.push(
        columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| cell(&c.name, *w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for task in tasks {
        let unmet = unmet_counts.get(&task.metadata.task_id).copied().unwrap_or(0);
        lines.push(
            columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| cell(&column_value(task, &c.name, unmet), *w))
                .collect::<Vec<_>>()
                .join("  "),
        );
    }
    lines.join("\n")
}

/// Tag table. The status breakdown is dropped when the rows are already
/// filtered to one status.
pub fn render_tag_counts(rows: &[TagCount], show_status_breakdown: bool) -> String {
    if rows.is_empty() {
        return "No tags found.".to_string();
    }
    let headers: &[&str] = if show_status_breakdown {
        &["tag", "total", "todo", "doing", "done"]
    } else {
        &["tag", "total"]
    };
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let all = [
                row.tag.clone(),
                row.total.to_string(),
                row.todo.to_string(),
                row.doing.to_string(),
                row.done.to_string(),
            ];
            all[..headers.len()].to_vec()
        })
        .collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(h.len())
        })
        .collect();

    let pad = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    let mut lines = vec![
        pad(headers.to_vec()),
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "),
    ];
    for row in &cells {
        lines.push(pad(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

fn inline_rows(rows: &[DependencyRow]) -> String {
    if rows.is_empty() {
        return "-".to_string();
    }
    rows.iter()
        .map(|r| format!("{} ({}) [{}]", r.task_name, r.task_id, r.status))
        .collect::<Vec<_>>()
        .join(", ")
}

fn file_lines(task: &Task) -> Vec<String> {
    let mut lines = vec![format!("dir: {}", task.dir_name())];
    let canonical = [task.task_md_path(), task.activity_path(), task.plan_path()];
    let names: Vec<String> = canonical
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    let files: Vec<String> = canonical
        .iter()
        .zip(&names)
        .map(|(path, name)| {
            if path.exists() {
                name.clone()
            } else {
                format!("{name} (missing)")
            }
        })
        .collect();
    lines.push(format!("files: {}", files.join(" | ")));

    match fs::read_dir(&task.dir) {
        Ok(entries) => {
            let mut extras: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|name| !names.contains(name))
                .collect();
            extras.sort();
            if !extras.is_empty() {
                lines.push(format!("extra: {}", extras.join(" | ")));
            }
        }
        Err(_) => lines.push("extra: (unavailable)".to_string()),
    }
    lines
}

pub fn render_task_detail(view: &TaskView) -> String {
    let meta = &view.task.metadata;
    let tags = if meta.tags.is_empty() {
        "-".to_string()
    } else {
        meta.tags.join(", ")
    };
    let date_or_dash = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());

    let mut lines = vec![
        format!("{} ({})", meta.task_name, meta.task_id),
        format!(
            "[{}] [{}] [{}] [deps: {}]",
            meta.status.as_str(),
            meta.priority.as_str(),
            meta.effort.as_str(),
            view.health.label()
        ),
        format!("owner: {}    tags: {tags}", meta.owner.as_deref().unwrap_or("-")),
        format!(
            "created: {}    started: {}    completed: {}",
            meta.date_created,
            date_or_dash(meta.date_started),
            date_or_dash(meta.date_completed)
        ),
        format!("depends_on: {}", inline_rows(&view.dependencies)),
        format!("blocked_by: {}", inline_rows(&view.blocked_by)),
    ];
    lines.extend(file_lines(&view.task));
    lines.push(String::new());
    let body = view.task.body.trim_start_matches('\n').trim_end();
    lines.push(if body.is_empty() { "(empty)".to_string() } else { body.to_string() });
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskMetadata;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("abcdef", 6), "abcdef");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abcdef", 1), "…");
        assert_eq!(truncate("abcdef", 0), "");
    }

    #[test]
    fn list_table_pads_and_truncates_columns() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let task = Task {
            metadata: TaskMetadata::new("t-20260801-001".into(), "a-long-task-name".into(), date),
            body: String::new(),
            dir: PathBuf::from("/r/.tasks/todo/2026-08-01-a-long-task-name"),
        };
        let columns = vec![
            ListColumn { name: "task_name".into(), width: 6 },
            ListColumn { name: "deps".into(), width: 10 },
        ];
        let unmet: HashMap<String, usize> = [("t-20260801-001".to_string(), 1)].into_iter().collect();
        let out = render_task_list(&[task], &unmet, &columns);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "task_…  deps      ");
        assert_eq!(lines[1], "------  ----------");
        assert_eq!(lines[2], "a-lon…  blocked(1)");
    }

    #[test]
    fn tag_table_sizes_to_content() {
        let rows = vec![TagCount {
            tag: "backend".into(),
            total: 12,
            todo: 3,
            doing: 4,
            done: 5,
        }];
        assert_eq!(
            render_tag_counts(&rows, false),
            "tag      total\n-------  -----\nbackend  12   "
        );
        assert_eq!(render_tag_counts(&[], true), "No tags found.");
    }
}
