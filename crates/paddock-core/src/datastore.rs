use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::service::{AnimalApi, TaskApi};
use crate::task::{Animal, Task};

/// Local stand-in for the animal and task services: `animals.json` holds every
/// animal, `tasks/<animal_id>.json` holds each animal's tasks.
#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub animals_path: PathBuf,
    pub tasks_dir: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        let tasks_dir = data_dir.join("tasks");
        fs::create_dir_all(&tasks_dir)
            .with_context(|| format!("failed to create {}", tasks_dir.display()))?;

        let animals_path = data_dir.join("animals.json");
        if !animals_path.exists() {
            fs::write(&animals_path, "[]\n")?;
        }

        info!(
            data_dir = %data_dir.display(),
            animals = %animals_path.display(),
            tasks = %tasks_dir.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            animals_path,
            tasks_dir,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_animals(&self) -> anyhow::Result<Vec<Animal>> {
        load_json(&self.animals_path).context("failed to load animals.json")
    }

    #[tracing::instrument(skip(self, animals))]
    pub fn save_animals(&self, animals: &[Animal]) -> anyhow::Result<()> {
        save_json_atomic(&self.animals_path, animals).context("failed to save animals.json")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_tasks(&self, animal_id: &str) -> anyhow::Result<Vec<Task>> {
        let path = self.tasks_path(animal_id)?;
        if !path.exists() {
            debug!(path = %path.display(), "no task file, treating as empty");
            return Ok(vec![]);
        }
        load_json(&path).with_context(|| format!("failed to load tasks for animal {animal_id}"))
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn save_tasks(&self, animal_id: &str, tasks: &[Task]) -> anyhow::Result<()> {
        let path = self.tasks_path(animal_id)?;
        save_json_atomic(&path, tasks)
            .with_context(|| format!("failed to save tasks for animal {animal_id}"))
    }

    #[tracing::instrument(skip(self))]
    pub fn find_animal(&self, animal_id: &str) -> anyhow::Result<Animal> {
        self.load_animals()?
            .into_iter()
            .find(|animal| animal.animal_id == animal_id)
            .ok_or_else(|| anyhow!("animal not found: {animal_id}"))
    }

    #[tracing::instrument(skip(self))]
    pub fn remove_task(&self, animal_id: &str, task_id: &str) -> anyhow::Result<Task> {
        let mut tasks = self.load_tasks(animal_id)?;
        let index = tasks
            .iter()
            .position(|task| task.task_id == task_id)
            .ok_or_else(|| anyhow!("task not found: {task_id}"))?;
        let removed = tasks.remove(index);
        self.save_tasks(animal_id, &tasks)?;
        info!(remaining = tasks.len(), "removed task");
        Ok(removed)
    }

    fn tasks_path(&self, animal_id: &str) -> anyhow::Result<PathBuf> {
        let valid = !animal_id.is_empty()
            && animal_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(anyhow!("invalid animal id: {animal_id:?}"));
        }
        Ok(self.tasks_dir.join(format!("{animal_id}.json")))
    }
}

impl AnimalApi for DataStore {
    async fn fetch_animal(&self, animal_id: &str) -> anyhow::Result<Animal> {
        self.find_animal(animal_id)
    }
}

impl TaskApi for DataStore {
    async fn fetch_tasks(&self, animal_id: &str) -> anyhow::Result<Vec<Task>> {
        self.load_tasks(animal_id)
    }

    async fn delete_task(&self, animal_id: &str, task_id: &str) -> anyhow::Result<()> {
        self.remove_task(animal_id, task_id).map(|_| ())
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn save_json_atomic<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("path has no parent: {}", path.display()))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;

    serde_json::to_writer_pretty(&mut tmp, items)?;
    writeln!(tmp)?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| anyhow!("failed to persist {}: {}", path.display(), e))?;

    Ok(())
}
