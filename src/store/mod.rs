mod data;
mod error;
mod persist;

pub use data::{parse_due_date, Field, Priority, SearchQuery, Stats, Task, TaskRef};
pub use error::StoreError;
pub use persist::{JsonFile, MemPersist, Persist};

#[cfg(test)]
pub(crate) use persist::FailingSave;

use log::warn;

use data::parse_completed;

/// Owns the ordered task collection and writes it through to the adapter
/// after every mutation. Display indices are 1-based positions and shift on
/// every delete, so they must be re-resolved before each operation.
#[derive(Debug)]
pub struct TaskStore<P: Persist> {
  tasks: Vec<Task>,
  persist: P,
}

impl<P: Persist> TaskStore<P> {
  /// Builds a store from whatever the adapter can read. A missing document
  /// means an empty list; an unreadable one is downgraded to an empty list
  /// with a warning, never a fatal error.
  pub fn load(persist: P) -> Self {
    let tasks = match persist.load() {
      Ok(tasks) => tasks,
      Err(err) => {
        warn!("could not load saved tasks, starting empty: {err}");
        Vec::new()
      }
    };
    Self { tasks, persist }
  }

  #[must_use]
  pub fn count(&self) -> usize {
    self.tasks.len()
  }

  pub fn list(&self) -> impl Iterator<Item = (usize, &Task)> {
    self
      .tasks
      .iter()
      .enumerate()
      .map(|(pos, task)| (pos + 1, task))
  }

  pub fn get(&self, index: usize) -> Result<&Task, StoreError> {
    self.resolve(index).map(|pos| &self.tasks[pos])
  }

  pub fn add(
    &mut self,
    description: &str,
    priority: Option<Priority>,
    due_date: Option<&str>,
    category: Option<&str>,
  ) -> Result<TaskRef, StoreError> {
    let description = description.trim();
    if description.is_empty() {
      return Err(StoreError::Validation(
        "task description cannot be empty".into(),
      ));
    }
    let due_date = due_date.map(parse_due_date).transpose()?;
    self.tasks.push(Task {
      description: description.to_owned(),
      completed: false,
      priority,
      due_date,
      category: category.map(|category| category.trim().to_owned()),
    });
    self.save()?;
    Ok(TaskRef(self.tasks.len()))
  }

  pub fn edit(&mut self, index: usize, field: Field, value: &str) -> Result<(), StoreError> {
    let pos = self.resolve(index)?;
    let task = &mut self.tasks[pos];
    match field {
      Field::Description => {
        let value = value.trim();
        if value.is_empty() {
          return Err(StoreError::Validation(
            "task description cannot be empty".into(),
          ));
        }
        task.description = value.to_owned();
      }
      Field::Priority => task.priority = cleared(value).map(|v| v.parse()).transpose()?,
      Field::DueDate => task.due_date = cleared(value).map(parse_due_date).transpose()?,
      Field::Category => task.category = cleared(value).map(str::to_owned),
      Field::Completed => task.completed = parse_completed(value)?,
    }
    self.save()
  }

  /// Marks every index that resolves; out-of-range entries are skipped
  /// silently, while a 0 anywhere cancels the whole call before any change.
  /// The asymmetry is a caller-visible quirk carried over from the original
  /// program, not an accident of this implementation.
  pub fn set_completed(&mut self, indices: &[usize], value: bool) -> Result<(), StoreError> {
    if indices.contains(&0) {
      return Err(StoreError::Canceled);
    }
    for &index in indices {
      if let Ok(pos) = self.resolve(index) {
        self.tasks[pos].completed = value;
      }
    }
    self.save()
  }

  /// Removes and returns the task at `index`. Confirmation is the calling
  /// layer's job; the store deletes unconditionally.
  pub fn delete(&mut self, index: usize) -> Result<Task, StoreError> {
    let pos = self.resolve(index)?;
    let task = self.tasks.remove(pos);
    self.save()?;
    Ok(task)
  }

  pub fn search(&self, query: &SearchQuery) -> Vec<(usize, &Task)> {
    self
      .list()
      .filter(|(_, task)| match query {
        SearchQuery::Keyword(word) => task
          .description
          .to_lowercase()
          .contains(&word.to_lowercase()),
        SearchQuery::Priority(priority) => task.priority == Some(*priority),
      })
      .collect()
  }

  /// `None` on an empty collection: there is no percentage to compute.
  #[must_use]
  pub fn statistics(&self) -> Option<Stats> {
    let total = self.tasks.len();
    if total == 0 {
      return None;
    }
    let completed_count = self.tasks.iter().filter(|task| task.completed).count();
    let by_priority =
      |priority| self.tasks.iter().filter(|task| task.priority == Some(priority)).count();
    Some(Stats {
      total,
      completed_count,
      high_count: by_priority(Priority::High),
      medium_count: by_priority(Priority::Medium),
      low_count: by_priority(Priority::Low),
      percent_complete: completed_count as f64 / total as f64 * 100.0,
    })
  }

  pub fn persist(&self) -> &P {
    &self.persist
  }

  fn resolve(&self, index: usize) -> Result<usize, StoreError> {
    if index >= 1 && index <= self.tasks.len() {
      Ok(index - 1)
    } else {
      Err(StoreError::OutOfRange(index))
    }
  }

  fn save(&self) -> Result<(), StoreError> {
    self.persist.save(&self.tasks)
  }
}

// The literal "none" clears an optional field, matching how absent fields
// render in listings.
fn cleared(value: &str) -> Option<&str> {
  let value = value.trim();
  if value.eq_ignore_ascii_case("none") {
    None
  } else {
    Some(value)
  }
}
