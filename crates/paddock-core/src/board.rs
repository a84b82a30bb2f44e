//! The task board for a single animal: loading, filtering, presentation and
//! the delete flow, driven by a host through discrete events.
//!
//! Remote calls are split into a begin step that hands out a ticket, the
//! awaited call itself, and an apply step that checks the ticket against the
//! board's current generation. Hosts that can hold `&mut TaskBoard` across the
//! await use the combined [`TaskBoard::load`] and [`TaskBoard::confirm_delete`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::deletion::DeleteFlow;
use crate::filter::{ViewMode, filter_tasks, mode_counts};
use crate::loader::{self, LoadGuard, LoadOutcome, LoadTicket};
use crate::presentation::{ConfirmDialog, EmptyState, TaskCard};
use crate::service::{AnimalApi, Navigator, NoticeKind, Notifier, Route, TaskApi};
use crate::task::{Animal, Task};

pub const MSG_ANIMAL_LOAD_FAILED: &str = "Failed to load animal data";
pub const MSG_TASKS_LOAD_FAILED: &str = "Failed to load tasks";
pub const MSG_TASK_DELETED: &str = "Task deleted successfully";
pub const MSG_DELETE_FAILED: &str = "Failed to delete task";
pub const MSG_TASK_ID_MISSING: &str = "Task ID is missing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTicket {
    pub generation: u64,
    pub animal_id: String,
    pub task_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView {
    Loading,
    NotFound,
    Ready(BoardPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPage {
    pub title: String,
    pub animal_id: String,
    pub mode: ViewMode,
    pub tabs: Vec<Tab>,
    pub body: BoardBody,
    pub confirm: Option<ConfirmDialog>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub mode: ViewMode,
    pub label: &'static str,
    pub count: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardBody {
    Cards(Vec<TaskCard>),
    Empty(EmptyState),
}

#[derive(Debug)]
pub struct TaskBoard {
    tz: Tz,
    animal_id: Option<String>,
    animal: Option<Animal>,
    tasks: Vec<Task>,
    loading: bool,
    mode: ViewMode,
    loads: LoadGuard,
    deletion: DeleteFlow,
}

impl TaskBoard {
    pub fn new(tz: Tz, mode: ViewMode) -> Self {
        Self {
            tz,
            animal_id: None,
            animal: None,
            tasks: Vec::new(),
            loading: true,
            mode,
            loads: LoadGuard::default(),
            deletion: DeleteFlow::Idle,
        }
    }

    pub fn animal_id(&self) -> Option<&str> {
        self.animal_id.as_deref()
    }

    pub fn animal(&self) -> Option<&Animal> {
        self.animal.as_ref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        debug!(mode = %mode, "view mode changed");
        self.mode = mode;
    }

    pub fn deletion(&self) -> &DeleteFlow {
        &self.deletion
    }

    pub fn visible_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        filter_tasks(&self.tasks, self.mode, now, &self.tz)
    }

    /// Starts a load for `animal_id`. A missing or blank id redirects to the
    /// animals list and returns `None`.
    #[tracing::instrument(skip(self, nav))]
    pub fn begin_load(
        &mut self,
        animal_id: Option<&str>,
        nav: &impl Navigator,
    ) -> Option<LoadTicket> {
        let Some(animal_id) = animal_id.map(str::trim).filter(|id| !id.is_empty()) else {
            info!("no animal id, redirecting to animal list");
            self.loads.cancel();
            self.loading = false;
            self.animal_id = None;
            self.animal = None;
            self.tasks.clear();
            self.deletion.reset();
            nav.navigate_to(Route::Animals);
            return None;
        };

        if self.animal_id.as_deref() != Some(animal_id) {
            self.animal = None;
            self.tasks.clear();
            self.deletion.reset();
            self.animal_id = Some(animal_id.to_string());
        }

        self.loading = true;
        Some(self.loads.issue(animal_id))
    }

    /// Applies a finished load. Returns `false` when the outcome belongs to a
    /// superseded load and was dropped.
    #[tracing::instrument(
        skip(self, outcome, notifier),
        fields(animal_id = %outcome.ticket.animal_id, generation = outcome.ticket.generation)
    )]
    pub fn apply_load(&mut self, outcome: LoadOutcome, notifier: &impl Notifier) -> bool {
        if !self.loads.is_current(outcome.ticket.generation) {
            debug!(
                current = self.loads.generation(),
                "dropping stale load result"
            );
            return false;
        }

        match outcome.animal {
            Ok(animal) => self.animal = Some(animal),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "animal fetch failed");
                self.animal = None;
                notifier.notify(NoticeKind::Error, MSG_ANIMAL_LOAD_FAILED);
            }
        }

        match outcome.tasks {
            Ok(tasks) => self.tasks = dedupe_by_id(tasks),
            Err(err) => {
                warn!(
                    error = %format!("{err:#}"),
                    kept = self.tasks.len(),
                    "task fetch failed"
                );
                notifier.notify(NoticeKind::Error, MSG_TASKS_LOAD_FAILED);
            }
        }

        self.loading = false;
        info!(
            found = self.animal.is_some(),
            tasks = self.tasks.len(),
            "board loaded"
        );
        true
    }

    pub async fn load<A>(
        &mut self,
        api: &A,
        animal_id: Option<&str>,
        notifier: &impl Notifier,
        nav: &impl Navigator,
    ) where
        A: AnimalApi + TaskApi,
    {
        let Some(ticket) = self.begin_load(animal_id, nav) else {
            return;
        };
        let outcome = loader::fetch(api, ticket).await;
        self.apply_load(outcome, notifier);
    }

    /// Abandons any in-flight load, e.g. when the host unmounts the board.
    pub fn cancel_load(&mut self) {
        self.loads.cancel();
        self.loading = false;
    }

    /// Selects a task for deletion and opens the confirmation.
    pub fn request_delete(&mut self, task_id: &str) -> bool {
        let Some(task) = self.tasks.iter().find(|t| t.task_id == task_id) else {
            warn!(task_id, "delete requested for unknown task");
            return false;
        };
        self.deletion.request(task.clone())
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.deletion.cancel()
    }

    /// Moves the confirmed candidate into `Deleting` and returns the remote
    /// call to make.
    pub fn begin_delete(&mut self) -> Option<DeleteTicket> {
        let Some(animal_id) = self.animal_id.clone() else {
            self.deletion.reset();
            return None;
        };
        let task = self.deletion.confirm()?;
        debug!(animal_id = %animal_id, task_id = %task.task_id, "deleting task");
        Some(DeleteTicket {
            generation: self.loads.generation(),
            animal_id,
            task_id: task.task_id,
        })
    }

    /// Applies the remote delete result. The collection changes only on
    /// success and only if the board still shows the same load.
    #[tracing::instrument(
        skip(self, ticket, result, notifier),
        fields(animal_id = %ticket.animal_id, task_id = %ticket.task_id)
    )]
    pub fn finish_delete(
        &mut self,
        ticket: DeleteTicket,
        result: anyhow::Result<()>,
        notifier: &impl Notifier,
    ) {
        let in_flight = self
            .deletion
            .candidate()
            .is_some_and(|task| task.task_id == ticket.task_id);
        if in_flight {
            self.deletion.finish();
        }

        match result {
            Ok(()) => {
                if self.loads.is_current(ticket.generation)
                    && self.animal_id.as_deref() == Some(ticket.animal_id.as_str())
                {
                    let before = self.tasks.len();
                    self.tasks.retain(|task| task.task_id != ticket.task_id);
                    debug!(removed = before - self.tasks.len(), "task removed");
                } else {
                    debug!("board moved on, not applying delete locally");
                }
                info!("task deleted");
                notifier.notify(NoticeKind::Success, MSG_TASK_DELETED);
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "task delete failed");
                notifier.notify(NoticeKind::Error, MSG_DELETE_FAILED);
            }
        }
    }

    /// Confirms the pending delete and runs it to completion. Returns `false`
    /// when nothing was awaiting confirmation.
    pub async fn confirm_delete<A>(&mut self, api: &A, notifier: &impl Notifier) -> bool
    where
        A: TaskApi,
    {
        let Some(ticket) = self.begin_delete() else {
            return false;
        };
        let result = api.delete_task(&ticket.animal_id, &ticket.task_id).await;
        self.finish_delete(ticket, result, notifier);
        true
    }

    pub fn back(&self, nav: &impl Navigator) {
        match &self.animal_id {
            Some(id) => nav.navigate_to(Route::Animal(id.clone())),
            None => nav.navigate_to(Route::Animals),
        }
    }

    pub fn back_to_animals(&self, nav: &impl Navigator) {
        nav.navigate_to(Route::Animals);
    }

    pub fn add_task(&self, nav: &impl Navigator) {
        match &self.animal_id {
            Some(id) => nav.navigate_to(Route::NewTask(id.clone())),
            None => nav.navigate_to(Route::Animals),
        }
    }

    pub fn edit_task(&self, task: &Task, nav: &impl Navigator, notifier: &impl Notifier) {
        let task_id = task.task_id.trim();
        if task_id.is_empty() {
            notifier.notify(NoticeKind::Error, MSG_TASK_ID_MISSING);
            return;
        }
        match &self.animal_id {
            Some(id) => nav.navigate_to(Route::EditTask {
                animal_id: id.clone(),
                task_id: task_id.to_string(),
            }),
            None => nav.navigate_to(Route::Animals),
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> BoardView {
        if self.loading {
            return BoardView::Loading;
        }
        let (Some(animal), Some(animal_id)) = (&self.animal, &self.animal_id) else {
            return BoardView::NotFound;
        };

        let tabs = mode_counts(&self.tasks, now, &self.tz)
            .into_iter()
            .map(|(mode, count)| Tab {
                mode,
                label: mode.label(),
                count,
                active: mode == self.mode,
            })
            .collect();

        let cards: Vec<TaskCard> = self
            .visible_tasks(now)
            .into_iter()
            .map(|task| TaskCard::build(task, now, &self.tz))
            .collect();
        let body = if cards.is_empty() {
            BoardBody::Empty(EmptyState::for_mode(self.mode))
        } else {
            BoardBody::Cards(cards)
        };

        let confirm = match &self.deletion {
            DeleteFlow::ConfirmPending(task) => Some(ConfirmDialog::for_task(task)),
            _ => None,
        };

        BoardView::Ready(BoardPage {
            title: format!("{}'s Tasks", animal.name),
            animal_id: animal_id.clone(),
            mode: self.mode,
            tabs,
            body,
            confirm,
        })
    }
}

fn dedupe_by_id(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let total = tasks.len();
    let unique: Vec<Task> = tasks
        .into_iter()
        .filter(|task| seen.insert(task.task_id.clone()))
        .collect();
    if unique.len() != total {
        warn!(
            dropped = total - unique.len(),
            "task list contained duplicate ids; kept first occurrence"
        );
    }
    unique
}
