use std::mem;

use tracing::{debug, warn};

use crate::task::Task;

/// Two-step delete confirmation. The candidate lives inside the state, so
/// there is no "deleting nothing" or "confirming nothing".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DeleteFlow {
    #[default]
    Idle,
    ConfirmPending(Task),
    Deleting(Task),
}

impl DeleteFlow {
    /// `Idle -> ConfirmPending`. Ignored in any other state.
    pub fn request(&mut self, task: Task) -> bool {
        match self {
            DeleteFlow::Idle => {
                debug!(task_id = %task.task_id, "delete requested, awaiting confirmation");
                *self = DeleteFlow::ConfirmPending(task);
                true
            }
            DeleteFlow::ConfirmPending(current) | DeleteFlow::Deleting(current) => {
                warn!(
                    pending = %current.task_id,
                    requested = %task.task_id,
                    "delete already in progress, ignoring request"
                );
                false
            }
        }
    }

    /// `ConfirmPending -> Idle`, discarding the candidate.
    pub fn cancel(&mut self) -> bool {
        match mem::take(self) {
            DeleteFlow::ConfirmPending(task) => {
                debug!(task_id = %task.task_id, "delete cancelled");
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// `ConfirmPending -> Deleting`. Returns the task to delete.
    pub fn confirm(&mut self) -> Option<Task> {
        match mem::take(self) {
            DeleteFlow::ConfirmPending(task) => {
                *self = DeleteFlow::Deleting(task.clone());
                Some(task)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// `Deleting -> Idle`. Returns the task that was being deleted.
    pub fn finish(&mut self) -> Option<Task> {
        match mem::take(self) {
            DeleteFlow::Deleting(task) => Some(task),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Drops any candidate without side effects.
    pub fn reset(&mut self) {
        *self = DeleteFlow::Idle;
    }

    pub fn candidate(&self) -> Option<&Task> {
        match self {
            DeleteFlow::Idle => None,
            DeleteFlow::ConfirmPending(task) | DeleteFlow::Deleting(task) => Some(task),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DeleteFlow::Idle)
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self, DeleteFlow::ConfirmPending(_))
    }
}
