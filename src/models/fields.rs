use serde::{Deserialize, Serialize};

use crate::error::TaskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Doing,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Todo, Self::Doing, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Accepts the bucket alias `done` in addition to the status names.
    pub fn from_filter(s: &str) -> Result<Self, TaskError> {
        let s = s.trim();
        if s == "done" {
            return Ok(Self::Completed);
        }
        Self::from_str(s).ok_or_else(|| {
            TaskError::validation(format!(
                "Invalid status filter: {s} (expected todo, doing, done)"
            ))
        })
    }

    /// Directory name of the bucket holding tasks with this status.
    pub fn bucket(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Completed => "done",
        }
    }

    pub fn from_bucket(bucket: &str) -> Option<Self> {
        match bucket {
            "todo" => Some(Self::Todo),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    P0,
    P1,
    #[default]
    P2,
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P0 => "p0",
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "p0" => Some(Self::P0),
            "p1" => Some(Self::P1),
            "p2" => Some(Self::P2),
            "p3" => Some(Self::P3),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, TaskError> {
        Self::from_str(s).ok_or_else(|| TaskError::validation(format!("Invalid priority: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    S,
    #[default]
    M,
    L,
    Xl,
}

impl Effort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S => "s",
            Self::M => "m",
            Self::L => "l",
            Self::Xl => "xl",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "s" => Some(Self::S),
            "m" => Some(Self::M),
            "l" => Some(Self::L),
            "xl" => Some(Self::Xl),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Result<Self, TaskError> {
        Self::from_str(s).ok_or_else(|| TaskError::validation(format!("Invalid effort: {s}")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecReadiness {
    #[default]
    Unspecified,
    Rough,
    Ready,
    Autonomous,
}

impl SpecReadiness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Rough => "rough",
            Self::Ready => "ready",
            Self::Autonomous => "autonomous",
        }
    }
}
