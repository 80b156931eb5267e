use std::fs::{self, OpenOptions};
use std::io::Write;

use chrono::NaiveDateTime;

use crate::error::TaskError;
use crate::models::Task;

pub const DEFAULT_ACTOR: &str = "human";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Create,
    Plan,
    Complete,
    Update,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Plan => "plan",
            Self::Complete => "complete",
            Self::Update => "update",
        }
    }
}

/// One parsed `activity.md` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub actor: String,
    pub kind: String,
    pub note: String,
}

pub fn format_line(actor: &str, kind: ActivityKind, note: &str, when: NaiveDateTime) -> String {
    format!(
        "{} | {actor} | {} | {note}\n",
        when.format("%Y-%m-%d %H:%M"),
        kind.as_str()
    )
}

/// Creates an empty `activity.md` if there is none.
pub fn touch(task: &Task) -> Result<(), TaskError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(task.activity_path())?;
    Ok(())
}

/// Appends one line. The log is never rewritten.
pub fn append_activity(
    task: &Task,
    actor: &str,
    kind: ActivityKind,
    note: &str,
    when: NaiveDateTime,
) -> Result<(), TaskError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(task.activity_path())?;
    file.write_all(format_line(actor, kind, note, when).as_bytes())?;
    Ok(())
}

pub fn read_activity(task: &Task) -> Result<Vec<ActivityEntry>, TaskError> {
    let path = task.activity_path();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(text.lines().filter_map(parse_line).collect())
}

fn parse_line(line: &str) -> Option<ActivityEntry> {
    let mut parts = line.splitn(4, " | ");
    Some(ActivityEntry {
        timestamp: parts.next()?.to_string(),
        actor: parts.next()?.to_string(),
        kind: parts.next()?.to_string(),
        note: parts.next()?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskMetadata;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn lines_are_pipe_delimited_and_appended() {
        let tmp = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let task = Task {
            metadata: TaskMetadata::new("t-20260401-001".into(), "a".into(), date),
            body: String::new(),
            dir: tmp.path().to_path_buf(),
        };
        let when = date.and_hms_opt(9, 5, 59).unwrap();

        touch(&task).unwrap();
        assert!(read_activity(&task).unwrap().is_empty());
        append_activity(&task, "human", ActivityKind::Create, "Task created (t-20260401-001)", when).unwrap();
        append_activity(&task, "bot", ActivityKind::Update, "a | b", when).unwrap();

        let text = fs::read_to_string(task.activity_path()).unwrap();
        assert_eq!(
            text,
            "2026-04-01 09:05 | human | create | Task created (t-20260401-001)\n\
             2026-04-01 09:05 | bot | update | a | b\n"
        );
        let entries = read_activity(&task).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].note, "a | b");
    }
}
