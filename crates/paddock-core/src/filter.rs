use std::fmt;

use chrono::{
  DateTime,
  Utc
};
use chrono_tz::Tz;

use crate::datetime::due_instant;
use crate::task::{
  Status,
  Task
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
)]
pub enum ViewMode {
  #[default]
  All,
  Pending,
  Completed,
  Overdue
}

impl ViewMode {
  pub const ALL: [ViewMode; 4] = [
    ViewMode::All,
    ViewMode::Pending,
    ViewMode::Completed,
    ViewMode::Overdue
  ];

  /// Unrecognized names select `All`.
  pub fn parse(raw: &str) -> Self {
    match raw
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "pending" => Self::Pending,
      | "completed" => Self::Completed,
      | "overdue" => Self::Overdue,
      | other => {
        if other != "all" {
          tracing::debug!(
            mode = %other,
            "unknown view mode, showing all tasks"
          );
        }
        Self::All
      }
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | Self::All => "all",
      | Self::Pending => "pending",
      | Self::Completed => "completed",
      | Self::Overdue => "overdue"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::All => "All Tasks",
      | Self::Pending => "Pending",
      | Self::Completed => "Completed",
      | Self::Overdue => "Overdue"
    }
  }

  pub fn matches(
    self,
    task: &Task,
    now: DateTime<Utc>,
    tz: &Tz
  ) -> bool {
    match self {
      | Self::All => true,
      | Self::Pending => {
        task.status_kind()
          == Status::Pending
      }
      | Self::Completed => {
        task.status_kind()
          == Status::Completed
      }
      | Self::Overdue => {
        is_past_due(task, now, tz)
      }
    }
  }
}

impl fmt::Display for ViewMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Due strictly before `now` and not
/// completed. Malformed due fields never
/// count as past due.
pub fn is_past_due(
  task: &Task,
  now: DateTime<Utc>,
  tz: &Tz
) -> bool {
  if task.is_completed() {
    return false;
  }

  due_instant(
    &task.start_date,
    &task.start_time,
    tz
  )
  .is_some_and(|due| due < now)
}

/// Borrowed subsequence of `tasks`
/// visible under `mode`, in original
/// order.
pub fn filter_tasks<'a>(
  tasks: &'a [Task],
  mode: ViewMode,
  now: DateTime<Utc>,
  tz: &Tz
) -> Vec<&'a Task> {
  tasks
    .iter()
    .filter(|task| {
      mode.matches(task, now, tz)
    })
    .collect()
}

/// Visible task count per mode, in tab
/// order.
pub fn mode_counts(
  tasks: &[Task],
  now: DateTime<Utc>,
  tz: &Tz
) -> [(ViewMode, usize); 4] {
  ViewMode::ALL.map(|mode| {
    let count = tasks
      .iter()
      .filter(|task| {
        mode.matches(task, now, tz)
      })
      .count();
    (mode, count)
  })
}
