//! Collaborators the board talks to. Implementations own transport and
//! persistence; the board only sees `anyhow::Result`s.

use std::fmt;
use std::future::Future;

use crate::task::{Animal, Task};

pub trait AnimalApi {
    fn fetch_animal(&self, animal_id: &str) -> impl Future<Output = anyhow::Result<Animal>>;
}

pub trait TaskApi {
    /// May return an empty list.
    fn fetch_tasks(&self, animal_id: &str) -> impl Future<Output = anyhow::Result<Vec<Task>>>;

    /// Deleting a task that no longer exists is an error.
    fn delete_task(
        &self,
        animal_id: &str,
        task_id: &str,
    ) -> impl Future<Output = anyhow::Result<()>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Fire-and-forget user notification sink.
pub trait Notifier {
    fn notify(&self, kind: NoticeKind, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Animals,
    Animal(String),
    NewTask(String),
    EditTask { animal_id: String, task_id: String },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Animals => f.write_str("/animals"),
            Route::Animal(id) => write!(f, "/animals/{id}"),
            Route::NewTask(id) => write!(f, "/animals/{id}/tasks/new"),
            Route::EditTask { animal_id, task_id } => {
                write!(f, "/animals/{animal_id}/tasks/{task_id}/edit")
            }
        }
    }
}

pub trait Navigator {
    fn navigate_to(&self, route: Route);
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn routes_render_as_paths() {
        assert_eq!(Route::Animals.to_string(), "/animals");
        assert_eq!(Route::Animal("7".into()).to_string(), "/animals/7");
        assert_eq!(Route::NewTask("7".into()).to_string(), "/animals/7/tasks/new");
        assert_eq!(
            Route::EditTask {
                animal_id: "7".into(),
                task_id: "t1".into()
            }
            .to_string(),
            "/animals/7/tasks/t1/edit"
        );
    }
}
