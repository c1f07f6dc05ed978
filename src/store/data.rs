use serde_derive::{Deserialize, Serialize};
use std::fmt::{Display, Error as FmtError, Formatter};
use std::str::FromStr;
use time::macros::format_description;
use time::Date;

use super::error::StoreError;

/// One task's full set of attributes. Optional fields stay out of the stored
/// document when absent, so records written by older versions keep loading.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Task {
  #[serde(rename = "Description")]
  pub description: String,
  #[serde(rename = "Completed", default)]
  pub completed: bool,
  #[serde(rename = "Priority", default, skip_serializing_if = "Option::is_none")]
  pub priority: Option<Priority>,
  #[serde(rename = "DueDate", default, skip_serializing_if = "Option::is_none")]
  pub due_date: Option<String>,
  #[serde(rename = "Category", default, skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Priority {
  High,
  Medium,
  Low,
}

impl Display for Priority {
  fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), FmtError> {
    formatter.write_str(match self {
      Self::High => "High",
      Self::Medium => "Medium",
      Self::Low => "Low",
    })
  }
}

impl FromStr for Priority {
  type Err = StoreError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "high" => Ok(Self::High),
      "medium" => Ok(Self::Medium),
      "low" => Ok(Self::Low),
      other => Err(StoreError::Validation(format!(
        "\"{other}\" is not a priority (expected High, Medium or Low)"
      ))),
    }
  }
}

/// Target of a single-field edit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
  Description,
  Priority,
  DueDate,
  Category,
  Completed,
}

impl FromStr for Field {
  type Err = StoreError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "description" => Ok(Self::Description),
      "priority" => Ok(Self::Priority),
      "due date" | "due_date" | "duedate" | "due" => Ok(Self::DueDate),
      "category" => Ok(Self::Category),
      "completed" => Ok(Self::Completed),
      other => Err(StoreError::Validation(format!(
        "\"{other}\" is not an editable field"
      ))),
    }
  }
}

#[derive(Clone, Debug)]
pub enum SearchQuery {
  /// Case-insensitive substring match on the description.
  Keyword(String),
  /// Exact priority match.
  Priority(Priority),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
  pub total: usize,
  pub completed_count: usize,
  pub high_count: usize,
  pub medium_count: usize,
  pub low_count: usize,
  pub percent_complete: f64,
}

/// Display index of a freshly added task. Only valid until the next mutation
/// of the collection shifts the numbering.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TaskRef(pub usize);

impl Display for TaskRef {
  fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), FmtError> {
    self.0.fmt(formatter)
  }
}

/// Checks that `value` names a real calendar date in `YYYY-MM-DD` form and
/// returns the trimmed text, which is what gets stored.
pub fn parse_due_date(value: &str) -> Result<String, StoreError> {
  let value = value.trim();
  let format = format_description!("[year]-[month]-[day]");
  Date::parse(value, &format).map_err(|_| {
    StoreError::Validation(format!("\"{value}\" is not a date in YYYY-MM-DD form"))
  })?;
  Ok(value.to_owned())
}

pub(crate) fn parse_completed(value: &str) -> Result<bool, StoreError> {
  match value.trim().to_lowercase().as_str() {
    "yes" | "y" | "true" => Ok(true),
    "no" | "n" | "false" => Ok(false),
    other => Err(StoreError::Validation(format!(
      "\"{other}\" is not a yes/no value"
    ))),
  }
}
