use std::cell::RefCell;
use std::io::{self, BufRead, Write};

use chrono::Utc;
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::board::TaskBoard;
use crate::cli::Command;
use crate::config::Config;
use crate::datastore::DataStore;
use crate::filter::ViewMode;
use crate::render::Renderer;
use crate::service::{Navigator, NoticeKind, Notifier, Route};

/// Prints notifications to stderr as they arrive.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => eprintln!("✔ {message}"),
            NoticeKind::Error => eprintln!("✖ {message}"),
        }
    }
}

/// Terminal hosts cannot switch pages, so routes are remembered and printed.
#[derive(Debug, Default)]
pub struct RouteRecorder {
    routes: RefCell<Vec<Route>>,
}

impl RouteRecorder {
    pub fn last(&self) -> Option<Route> {
        self.routes.borrow().last().cloned()
    }
}

impl Navigator for RouteRecorder {
    fn navigate_to(&self, route: Route) {
        info!(route = %route, "navigate");
        self.routes.borrow_mut().push(route);
    }
}

#[tracing::instrument(skip_all)]
pub async fn dispatch(
    store: &DataStore,
    cfg: &Config,
    tz: Tz,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()> {
    let notifier = TerminalNotifier;
    let nav = RouteRecorder::default();
    let mut board = TaskBoard::new(tz, cfg.default_view());

    match command {
        Command::Show { animal_id, view } => {
            info!("command show");
            if let Some(view) = view {
                board.set_mode(ViewMode::parse(&view));
            }
            board.load(store, animal_id.as_deref(), &notifier, &nav).await;
            if let Some(route) = nav.last() {
                println!("{route}");
                return Ok(());
            }
            renderer.print_board(&board.view(Utc::now()))?;
        }
        Command::Delete {
            animal_id,
            task_id,
            yes,
        } => {
            info!("command delete");
            board.load(store, Some(animal_id.as_str()), &notifier, &nav).await;
            if board.animal().is_none() {
                renderer.print_board(&board.view(Utc::now()))?;
                return Ok(());
            }
            if !board.request_delete(&task_id) {
                notifier.notify(NoticeKind::Error, "Task not found");
                return Ok(());
            }

            renderer.print_board(&board.view(Utc::now()))?;
            let confirmed = yes || prompt_confirm(io::stdin().lock(), io::stderr())?;
            if confirmed {
                board.confirm_delete(store, &notifier).await;
            } else {
                board.cancel_delete();
                info!(task_id = %task_id, "delete cancelled by user");
            }
            renderer.print_board(&board.view(Utc::now()))?;
        }
        Command::Add { animal_id } => {
            info!("command add");
            board.load(store, Some(animal_id.as_str()), &notifier, &nav).await;
            if board.animal().is_some() {
                board.add_task(&nav);
            } else {
                board.back_to_animals(&nav);
            }
            print_route(&nav);
        }
        Command::Edit { animal_id, task_id } => {
            info!("command edit");
            board.load(store, Some(animal_id.as_str()), &notifier, &nav).await;
            if board.animal().is_none() {
                board.back_to_animals(&nav);
                print_route(&nav);
                return Ok(());
            }
            match board.tasks().iter().find(|t| t.task_id == task_id) {
                Some(task) => {
                    board.edit_task(task, &nav, &notifier);
                    print_route(&nav);
                }
                None => {
                    warn!(task_id = %task_id, "edit requested for unknown task");
                    notifier.notify(NoticeKind::Error, "Task not found");
                }
            }
        }
    }

    Ok(())
}

fn print_route(nav: &RouteRecorder) {
    if let Some(route) = nav.last() {
        println!("{route}");
    }
}

fn prompt_confirm<R: BufRead, W: Write>(mut input: R, mut prompt: W) -> anyhow::Result<bool> {
    write!(prompt, "Delete this task? [y/N] ")?;
    prompt.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
