//! Display attributes for tasks: tones, icons, badges and the card model a
//! host renders. Everything here is a pure function of a task and a clock.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::datetime::{format_due, relative_created};
use crate::filter::{ViewMode, is_past_due};
use crate::task::{Priority, Status, Task};

pub const NO_DESCRIPTION: &str = "No description provided";
pub const CONFIRM_DELETE_TITLE: &str = "Confirm Deletion";
pub const CONFIRM_DELETE_DESCRIPTION: &str =
    "Are you sure you want to delete this task? This action cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Amber,
    Green,
    Blue,
    Gray,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Red => "bg-red-100 text-red-800",
            Self::Amber => "bg-amber-100 text-amber-800",
            Self::Green => "bg-green-100 text-green-800",
            Self::Blue => "bg-blue-100 text-blue-800",
            Self::Gray => "bg-gray-100 text-gray-800",
        }
    }

    pub fn ansi_code(self) -> &'static str {
        match self {
            Self::Red => "31",
            Self::Amber => "33",
            Self::Green => "32",
            Self::Blue => "34",
            Self::Gray => "90",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Tag,
    BarChart,
    CheckCircle,
    Clock,
    AlertTriangle,
    XCircle,
}

impl Icon {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Tag => "#",
            Self::BarChart => "▮",
            Self::CheckCircle => "✔",
            Self::Clock => "◷",
            Self::AlertTriangle => "⚠",
            Self::XCircle => "✖",
        }
    }
}

/// Lookup table keyed by a parsed enum with a fallback for keys that have
/// no entry.
#[derive(Debug)]
pub struct StyleTable<K: 'static, V: 'static> {
    entries: &'static [(K, V)],
    fallback: V,
}

impl<K: PartialEq + Copy, V: Copy> StyleTable<K, V> {
    pub const fn new(entries: &'static [(K, V)], fallback: V) -> Self {
        Self { entries, fallback }
    }

    pub fn get(&self, key: K) -> V {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| *value)
            .unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub tone: Tone,
    pub icon: Option<Icon>,
}

pub const PRIORITY_STYLES: StyleTable<Priority, Tone> = StyleTable::new(
    &[
        (Priority::High, Tone::Red),
        (Priority::Medium, Tone::Amber),
        (Priority::Low, Tone::Green),
    ],
    Tone::Gray,
);

pub const STATUS_STYLES: StyleTable<Status, StatusStyle> = StyleTable::new(
    &[
        (
            Status::Completed,
            StatusStyle {
                tone: Tone::Green,
                icon: Some(Icon::CheckCircle),
            },
        ),
        (
            Status::InProgress,
            StatusStyle {
                tone: Tone::Blue,
                icon: Some(Icon::Clock),
            },
        ),
        (
            Status::Pending,
            StatusStyle {
                tone: Tone::Amber,
                icon: Some(Icon::AlertTriangle),
            },
        ),
        (
            Status::Cancelled,
            StatusStyle {
                tone: Tone::Red,
                icon: Some(Icon::XCircle),
            },
        ),
    ],
    StatusStyle {
        tone: Tone::Gray,
        icon: None,
    },
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: Option<Tone>,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCard {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub created: String,
    pub due: String,
    pub past_due: bool,
    pub badges: Vec<Badge>,
}

impl TaskCard {
    pub fn build(task: &Task, now: DateTime<Utc>, tz: &Tz) -> Self {
        let mut badges = Vec::with_capacity(3);

        if let Some(task_type) = non_blank(task.task_type.as_deref()) {
            badges.push(Badge {
                label: task_type.to_string(),
                tone: None,
                icon: Some(Icon::Tag),
            });
        }

        if let Some(priority) = non_blank(task.priority.as_deref()) {
            badges.push(Badge {
                label: priority.to_string(),
                tone: Some(PRIORITY_STYLES.get(task.priority_kind())),
                icon: Some(Icon::BarChart),
            });
        }

        if let Some(status) = non_blank(task.status.as_deref()) {
            let style = STATUS_STYLES.get(task.status_kind());
            badges.push(Badge {
                label: status.to_string(),
                tone: Some(style.tone),
                icon: style.icon,
            });
        }

        Self {
            task_id: task.task_id.clone(),
            title: task.title.clone(),
            description: non_blank(task.description.as_deref())
                .unwrap_or(NO_DESCRIPTION)
                .to_string(),
            created: relative_created(&task.created_at, now, tz),
            due: format!("Due: {}", format_due(&task.start_date, &task.start_time, tz)),
            past_due: is_past_due(task, now, tz),
            badges,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub heading: String,
    pub message: String,
}

impl EmptyState {
    pub fn for_mode(mode: ViewMode) -> Self {
        match mode {
            ViewMode::All => Self {
                heading: "No Tasks".to_string(),
                message: "No tasks have been recorded for this animal yet.".to_string(),
            },
            other => Self {
                heading: format!("No {other} Tasks"),
                message: format!("No {other} tasks found for this animal."),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub title: &'static str,
    pub description: &'static str,
    pub task_title: String,
}

impl ConfirmDialog {
    pub fn for_task(task: &Task) -> Self {
        Self {
            title: CONFIRM_DELETE_TITLE,
            description: CONFIRM_DELETE_DESCRIPTION,
            task_title: task.title.clone(),
        }
    }
}
