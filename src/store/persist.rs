use std::cell::RefCell;
use std::fs;
use std::io::{Error as IoError, ErrorKind};
use std::path::PathBuf;

use super::{StoreError, Task};

/// Storage seam for the whole task collection: one serialized document,
/// loaded once at startup and overwritten after every mutation.
pub trait Persist {
  fn load(&self) -> Result<Vec<Task>, StoreError>;
  fn save(&self, tasks: &[Task]) -> Result<(), StoreError>;
}

/// Whole-document JSON file adapter. The save is a single-shot overwrite,
/// not a write-ahead log, so atomicity across process crashes is not
/// guaranteed.
#[derive(Debug)]
pub struct JsonFile {
  path: PathBuf,
}

impl JsonFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl Persist for JsonFile {
  fn load(&self) -> Result<Vec<Task>, StoreError> {
    let document = match fs::read_to_string(&self.path) {
      Ok(document) => document,
      Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
      Err(err) => return Err(err.into()),
    };
    serde_json::from_str(&document).map_err(StoreError::CorruptData)
  }

  fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
    let document = serde_json::to_string_pretty(tasks).map_err(IoError::from)?;
    fs::write(&self.path, document)?;
    Ok(())
  }
}

/// Adapter whose saves always fail, for exercising the path where a
/// mutation stays in memory but never reaches storage.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FailingSave;

#[cfg(test)]
impl Persist for FailingSave {
  fn load(&self) -> Result<Vec<Task>, StoreError> {
    Ok(Vec::new())
  }

  fn save(&self, _tasks: &[Task]) -> Result<(), StoreError> {
    Err(StoreError::Io(IoError::new(
      ErrorKind::PermissionDenied,
      "storage is read-only",
    )))
  }
}

/// In-memory adapter for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemPersist {
  tasks: RefCell<Vec<Task>>,
}

impl MemPersist {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }
}

impl Persist for MemPersist {
  fn load(&self) -> Result<Vec<Task>, StoreError> {
    Ok(self.tasks.borrow().clone())
  }

  fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
    *self.tasks.borrow_mut() = tasks.to_vec();
    Ok(())
  }
}
