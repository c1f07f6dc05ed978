use thiserror::Error;

/// Errors surfaced by the task store and its persistence adapter. All of them
/// are recoverable: the caller reports them and keeps going.
#[derive(Debug, Error)]
pub enum StoreError {
  /// Bad or empty input, including unknown field names.
  #[error("{0}")]
  Validation(String),
  /// Index outside the current 1-based bounds of the collection.
  #[error("there is no task number {0} in the list")]
  OutOfRange(usize),
  /// The user entered the 0 sentinel to abort the operation.
  #[error("operation canceled")]
  Canceled,
  /// The stored document exists but cannot be parsed.
  #[error("stored task data is unreadable: {0}")]
  CorruptData(#[source] serde_json::Error),
  /// The storage location cannot be read or written.
  #[error("storage error: {0}")]
  Io(#[from] std::io::Error),
}
