use tracing::debug;

use crate::service::{AnimalApi, TaskApi};
use crate::task::{Animal, Task};

/// Generation counter guarding against out-of-order completions. Each load
/// gets a ticket; only the most recently issued ticket may be applied.
#[derive(Debug, Default)]
pub struct LoadGuard {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub animal_id: String,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub animal: anyhow::Result<Animal>,
    pub tasks: anyhow::Result<Vec<Task>>,
}

impl LoadGuard {
    pub fn issue(&mut self, animal_id: &str) -> LoadTicket {
        self.generation += 1;
        debug!(generation = self.generation, animal_id, "issued load ticket");
        LoadTicket {
            generation: self.generation,
            animal_id: animal_id.to_string(),
        }
    }

    /// Invalidates every outstanding ticket.
    pub fn cancel(&mut self) {
        self.generation += 1;
        debug!(generation = self.generation, "cancelled outstanding loads");
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// Runs both retrievals for `ticket` concurrently. Neither failure
/// short-circuits the other.
#[tracing::instrument(skip(api, ticket), fields(animal_id = %ticket.animal_id, generation = ticket.generation))]
pub async fn fetch<A>(api: &A, ticket: LoadTicket) -> LoadOutcome
where
    A: AnimalApi + TaskApi,
{
    let (animal, tasks) = tokio::join!(
        api.fetch_animal(&ticket.animal_id),
        api.fetch_tasks(&ticket.animal_id)
    );

    debug!(
        animal_ok = animal.is_ok(),
        tasks_ok = tasks.is_ok(),
        "load finished"
    );

    LoadOutcome {
        ticket,
        animal,
        tasks,
    }
}
