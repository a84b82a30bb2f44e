use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Animal {
    pub animal_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
    Unrecognized,
}

impl Priority {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Unrecognized,
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "in progress" | "in-progress" | "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Unrecognized,
        }
    }
}

/// A task as the task service returns it. Priority and status keep the raw
/// text for display; use [`Task::priority_kind`] and [`Task::status_kind`]
/// for logic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub task_id: String,

    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub task_type: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub start_date: String,

    #[serde(default)]
    pub start_time: String,

    #[serde(default)]
    pub created_at: String,
}

impl Task {
    pub fn new(task_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            title: title.into(),
            description: None,
            task_type: None,
            priority: None,
            status: None,
            start_date: String::new(),
            start_time: String::new(),
            created_at: String::new(),
        }
    }

    pub fn priority_kind(&self) -> Priority {
        self.priority
            .as_deref()
            .map(Priority::parse)
            .unwrap_or(Priority::Unrecognized)
    }

    pub fn status_kind(&self) -> Status {
        self.status
            .as_deref()
            .map(Status::parse)
            .unwrap_or(Status::Unrecognized)
    }

    pub fn is_completed(&self) -> bool {
        self.status_kind() == Status::Completed
    }
}
