use std::cell::RefCell;

use anyhow::anyhow;
use chrono::{DateTime, Duration, TimeZone, Utc};
use paddock_core::board::{BoardBody, BoardView, MSG_TASK_ID_MISSING, TaskBoard};
use paddock_core::deletion::DeleteFlow;
use paddock_core::filter::ViewMode;
use paddock_core::loader;
use paddock_core::service::{AnimalApi, Navigator, NoticeKind, Notifier, Route, TaskApi};
use paddock_core::task::{Animal, Task};

#[derive(Default)]
struct FakeApi {
    animal: Option<Animal>,
    tasks: Option<Vec<Task>>,
    fail_delete: bool,
    deletes: RefCell<Vec<(String, String)>>,
}

impl AnimalApi for FakeApi {
    async fn fetch_animal(&self, animal_id: &str) -> anyhow::Result<Animal> {
        self.animal
            .clone()
            .filter(|a| a.animal_id == animal_id)
            .ok_or_else(|| anyhow!("animal {animal_id} not found"))
    }
}

impl TaskApi for FakeApi {
    async fn fetch_tasks(&self, _animal_id: &str) -> anyhow::Result<Vec<Task>> {
        self.tasks.clone().ok_or_else(|| anyhow!("task service unavailable"))
    }

    async fn delete_task(&self, animal_id: &str, task_id: &str) -> anyhow::Result<()> {
        self.deletes
            .borrow_mut()
            .push((animal_id.to_string(), task_id.to_string()));
        if self.fail_delete {
            Err(anyhow!("server said no"))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct Recorder {
    notices: RefCell<Vec<(NoticeKind, String)>>,
    routes: RefCell<Vec<Route>>,
}

impl Notifier for Recorder {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices.borrow_mut().push((kind, message.to_string()));
    }
}

impl Navigator for Recorder {
    fn navigate_to(&self, route: Route) {
        self.routes.borrow_mut().push(route);
    }
}

impl Recorder {
    fn kinds(&self) -> Vec<NoticeKind> {
        self.notices.borrow().iter().map(|(k, _)| *k).collect()
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 16, 12, 0, 0)
        .single()
        .expect("valid now")
}

fn bella() -> Animal {
    Animal {
        animal_id: "bella".to_string(),
        name: "Bella".to_string(),
    }
}

fn task(id: &str, status: &str, due: DateTime<Utc>) -> Task {
    let mut task = Task::new(id, format!("Task {id}"));
    task.status = Some(status.to_string());
    task.start_date = due.format("%Y-%m-%d").to_string();
    task.start_time = due.format("%H:%M").to_string();
    task.created_at = (now() - Duration::days(1)).to_rfc3339();
    task
}

fn sample_tasks() -> Vec<Task> {
    vec![
        task("1", "pending", now() - Duration::days(1)),
        task("2", "Completed", now() - Duration::days(1)),
        task("3", "pending", now() + Duration::days(1)),
    ]
}

fn api() -> FakeApi {
    FakeApi {
        animal: Some(bella()),
        tasks: Some(sample_tasks()),
        ..FakeApi::default()
    }
}

fn ids(board: &TaskBoard) -> Vec<String> {
    board.tasks().iter().map(|t| t.task_id.clone()).collect()
}

#[tokio::test]
async fn successful_load_shows_every_task_by_default() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::default());

    board.load(&api, Some("bella"), &rec, &rec).await;

    assert!(!board.is_loading());
    assert_eq!(board.animal(), Some(&bella()));
    assert!(rec.notices.borrow().is_empty());

    let BoardView::Ready(page) = board.view(now()) else {
        panic!("expected ready view");
    };
    assert_eq!(page.title, "Bella's Tasks");
    assert_eq!(page.mode, ViewMode::All);
    let BoardBody::Cards(cards) = &page.body else {
        panic!("expected cards");
    };
    assert_eq!(cards.len(), 3);
    assert_eq!(
        page.tabs.iter().map(|t| t.count).collect::<Vec<_>>(),
        vec![3, 2, 1, 1]
    );
    assert!(page.tabs[0].active);
}

#[tokio::test]
async fn mode_switch_rederives_visible_tasks() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;

    board.set_mode(ViewMode::parse("overdue"));
    let visible: Vec<_> = board.visible_tasks(now()).iter().map(|t| t.task_id.clone()).collect();
    assert_eq!(visible, vec!["1"]);

    board.set_mode(ViewMode::parse("something-else"));
    assert_eq!(board.visible_tasks(now()).len(), 3);
    assert_eq!(board.tasks().len(), 3);
}

#[tokio::test]
async fn animal_failure_renders_not_found() {
    let api = FakeApi {
        animal: None,
        tasks: Some(sample_tasks()),
        ..FakeApi::default()
    };
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);

    board.load(&api, Some("bella"), &rec, &rec).await;

    assert!(!board.is_loading());
    assert_eq!(board.view(now()), BoardView::NotFound);
    assert_eq!(rec.kinds(), vec![NoticeKind::Error]);
}

#[tokio::test]
async fn task_failure_keeps_animal_visible() {
    let api = FakeApi {
        animal: Some(bella()),
        tasks: None,
        ..FakeApi::default()
    };
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);

    board.load(&api, Some("bella"), &rec, &rec).await;

    assert_eq!(rec.kinds(), vec![NoticeKind::Error]);
    let BoardView::Ready(page) = board.view(now()) else {
        panic!("expected ready view");
    };
    assert!(matches!(page.body, BoardBody::Empty(_)));
}

#[tokio::test]
async fn failed_reload_of_same_animal_keeps_stale_tasks() {
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api(), Some("bella"), &rec, &rec).await;

    let broken = FakeApi {
        animal: Some(bella()),
        tasks: None,
        ..FakeApi::default()
    };
    board.load(&broken, Some("bella"), &rec, &rec).await;

    assert_eq!(ids(&board), vec!["1", "2", "3"]);
    assert_eq!(rec.kinds(), vec![NoticeKind::Error]);
}

#[tokio::test]
async fn both_failures_notify_once_each() {
    let api = FakeApi::default();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);

    board.load(&api, Some("bella"), &rec, &rec).await;

    assert_eq!(rec.kinds(), vec![NoticeKind::Error, NoticeKind::Error]);
    assert_eq!(board.view(now()), BoardView::NotFound);
}

#[tokio::test]
async fn missing_id_redirects_without_loading() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);

    board.load(&api, None, &rec, &rec).await;
    board.load(&api, Some("  "), &rec, &rec).await;

    assert_eq!(*rec.routes.borrow(), vec![Route::Animals, Route::Animals]);
    assert!(board.animal().is_none());
    assert!(!board.is_loading());
    assert!(rec.notices.borrow().is_empty());
}

#[tokio::test]
async fn redirect_after_load_drops_previous_animal() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;
    assert!(matches!(board.view(now()), BoardView::Ready(_)));

    board.load(&api, None, &rec, &rec).await;

    assert_eq!(*rec.routes.borrow(), vec![Route::Animals]);
    assert_eq!(board.animal_id(), None);
    assert!(board.tasks().is_empty());
    assert_eq!(board.view(now()), BoardView::NotFound);
    assert!(!board.request_delete("1"));
    assert!(board.begin_delete().is_none());
}

#[test]
fn fresh_board_renders_loading() {
    let board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    assert!(board.is_loading());
    assert_eq!(board.view(now()), BoardView::Loading);
}

#[tokio::test]
async fn stale_load_does_not_overwrite_newer_animal() {
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);

    let old_api = api();
    let new_api = FakeApi {
        animal: Some(Animal {
            animal_id: "rex".to_string(),
            name: "Rex".to_string(),
        }),
        tasks: Some(vec![task("9", "pending", now())]),
        ..FakeApi::default()
    };

    let old_ticket = board.begin_load(Some("bella"), &rec).expect("ticket");
    let new_ticket = board.begin_load(Some("rex"), &rec).expect("ticket");
    assert!(board.is_loading());

    let new_outcome = loader::fetch(&new_api, new_ticket).await;
    let old_outcome = loader::fetch(&old_api, old_ticket).await;

    assert!(board.apply_load(new_outcome, &rec));
    assert!(!board.apply_load(old_outcome, &rec));

    assert_eq!(board.animal().map(|a| a.name.as_str()), Some("Rex"));
    assert_eq!(ids(&board), vec!["9"]);
    assert!(!board.is_loading());
}

#[tokio::test]
async fn cancelled_load_is_ignored() {
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    let ticket = board.begin_load(Some("bella"), &rec).expect("ticket");
    board.cancel_load();

    let outcome = loader::fetch(&api(), ticket).await;
    assert!(!board.apply_load(outcome, &rec));
    assert!(board.animal().is_none());
    assert!(board.tasks().is_empty());
}

#[tokio::test]
async fn confirmed_delete_removes_exactly_one_task() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;

    assert!(board.request_delete("2"));
    let BoardView::Ready(page) = board.view(now()) else {
        panic!("expected ready view");
    };
    let dialog = page.confirm.expect("confirm dialog");
    assert_eq!(dialog.title, "Confirm Deletion");
    assert_eq!(dialog.task_title, "Task 2");

    assert!(board.confirm_delete(&api, &rec).await);

    assert_eq!(ids(&board), vec!["1", "3"]);
    assert_eq!(
        *api.deletes.borrow(),
        vec![("bella".to_string(), "2".to_string())]
    );
    assert_eq!(
        *rec.notices.borrow(),
        vec![(NoticeKind::Success, "Task deleted successfully".to_string())]
    );
    assert!(board.deletion().is_idle());
}

#[tokio::test]
async fn failed_delete_leaves_collection_untouched() {
    let api = FakeApi {
        fail_delete: true,
        ..api()
    };
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;
    let before = board.tasks().to_vec();

    board.request_delete("1");
    assert!(board.confirm_delete(&api, &rec).await);

    assert_eq!(board.tasks(), before.as_slice());
    assert_eq!(
        *rec.notices.borrow(),
        vec![(NoticeKind::Error, "Failed to delete task".to_string())]
    );
    assert!(board.deletion().is_idle());
}

#[tokio::test]
async fn cancelled_delete_has_no_side_effects() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;

    board.request_delete("3");
    assert!(board.cancel_delete());
    assert!(!board.confirm_delete(&api, &rec).await);

    assert_eq!(board.tasks().len(), 3);
    assert!(api.deletes.borrow().is_empty());
    assert!(rec.notices.borrow().is_empty());
    assert_eq!(*board.deletion(), DeleteFlow::Idle);
}

#[tokio::test]
async fn delete_finishing_after_navigation_is_not_applied() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;

    board.request_delete("1");
    let ticket = board.begin_delete().expect("delete ticket");

    // The host reloads the same animal while the delete is in flight.
    board.load(&api, Some("bella"), &rec, &rec).await;
    board.finish_delete(ticket, Ok(()), &rec);

    assert_eq!(ids(&board), vec!["1", "2", "3"]);
    assert!(board.deletion().is_idle());
    assert_eq!(rec.kinds(), vec![NoticeKind::Success]);
}

#[tokio::test]
async fn navigation_entry_points() {
    let api = api();
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;

    board.add_task(&rec);
    board.back(&rec);
    let first = board.tasks()[0].clone();
    board.edit_task(&first, &rec, &rec);
    board.edit_task(&Task::new("  ", "No id"), &rec, &rec);

    assert_eq!(
        *rec.routes.borrow(),
        vec![
            Route::NewTask("bella".to_string()),
            Route::Animal("bella".to_string()),
            Route::EditTask {
                animal_id: "bella".to_string(),
                task_id: "1".to_string()
            },
        ]
    );
    assert_eq!(
        *rec.notices.borrow(),
        vec![(NoticeKind::Error, MSG_TASK_ID_MISSING.to_string())]
    );
}

#[tokio::test]
async fn duplicate_ids_from_service_are_collapsed() {
    let api = FakeApi {
        animal: Some(bella()),
        tasks: Some(vec![
            task("1", "pending", now()),
            task("1", "completed", now()),
            task("2", "pending", now()),
        ]),
        ..FakeApi::default()
    };
    let rec = Recorder::default();
    let mut board = TaskBoard::new(chrono_tz::UTC, ViewMode::All);
    board.load(&api, Some("bella"), &rec, &rec).await;

    assert_eq!(ids(&board), vec!["1", "2"]);
    assert_eq!(board.tasks()[0].status.as_deref(), Some("pending"));
}
