use clap::Parser;
use std::error::Error;
use std::io::{stdin, stdout, BufRead, Error as IoError, Write};

use crate::store::{
  parse_due_date, Field, JsonFile, Persist, Priority, SearchQuery, StoreError, Task, TaskStore,
};

#[derive(Debug, Parser)]
#[command(name = "todotrack", about)]
struct Opts {
  /// File to load tasks from and save tasks to.
  #[arg(long, short, default_value = "tasks.json")]
  file: String,
}

const MENU_OPTIONS: [(usize, &str); 8] = [
  (1, "Add a Task"),
  (2, "View Tasks"),
  (3, "Mark Tasks as Complete"),
  (4, "Delete a Task"),
  (5, "Edit a Task"),
  (6, "Search Tasks"),
  (7, "View Statistics"),
  (8, "Exit"),
];

pub fn cli() -> Result<(), Box<dyn Error>> {
  let opts = Opts::parse();
  let mut store = TaskStore::load(JsonFile::new(opts.file));
  let stdin = stdin();
  run_menu(&mut store, &mut stdin.lock(), &mut stdout())
}

/// Drives one whole interactive session. Input and output are generic so
/// tests can script sessions against byte buffers.
pub fn run_menu<P: Persist, R: BufRead, W: Write>(
  store: &mut TaskStore<P>,
  input: &mut R,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  if store.count() > 0 {
    writeln!(output, "Tasks have been loaded from the file.")?;
  } else {
    writeln!(output, "No saved tasks found. Starting with an empty task list.")?;
  }
  loop {
    print_menu(output)?;
    let Some(choice) = prompt(input, output, "\nEnter your choice (number): ")? else {
      break;
    };
    match choice.as_str() {
      "1" => add_task(store, input, output)?,
      "2" => view_tasks(store, output)?,
      "3" => mark_complete(store, input, output)?,
      "4" => delete_task(store, input, output)?,
      "5" => edit_task(store, input, output)?,
      "6" => search_tasks(store, input, output)?,
      "7" => show_statistics(store, output)?,
      "8" => {
        writeln!(output, "\nExiting To-Do List application. Goodbye!")?;
        break;
      }
      _ => writeln!(output, "Invalid option. Please enter a number between 1 and 8.")?,
    }
  }
  Ok(())
}

fn print_menu<W: Write>(output: &mut W) -> Result<(), IoError> {
  writeln!(output, "\nMAIN MENU")?;
  for (key, label) in MENU_OPTIONS {
    writeln!(output, "{key} -- {label}")?;
  }
  Ok(())
}

/// Writes the prompt, then reads and trims one line. `None` means the input
/// ended, which callers treat like leaving the current menu.
fn prompt<R: BufRead, W: Write>(
  input: &mut R,
  output: &mut W,
  text: &str,
) -> Result<Option<String>, Box<dyn Error>> {
  write!(output, "{text}")?;
  output.flush()?;
  let mut line = String::new();
  if input.read_line(&mut line)? == 0 {
    return Ok(None);
  }
  Ok(Some(line.trim().to_owned()))
}

fn add_task<P: Persist, R: BufRead, W: Write>(
  store: &mut TaskStore<P>,
  input: &mut R,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  let description = loop {
    let Some(line) = prompt(input, output, "Write a task to add to your list, then hit enter: ")?
    else {
      return Ok(());
    };
    if line.is_empty() {
      writeln!(output, "Task description cannot be empty. Please try again.")?;
    } else {
      break line;
    }
  };
  let priority = loop {
    let Some(line) = prompt(input, output, "Priority (High/Medium/Low, blank for none): ")? else {
      return Ok(());
    };
    if line.is_empty() {
      break None;
    }
    match line.parse::<Priority>() {
      Ok(priority) => break Some(priority),
      Err(err) => writeln!(output, "{err}")?,
    }
  };
  let due_date = loop {
    let Some(line) = prompt(input, output, "Due date (YYYY-MM-DD, blank for none): ")? else {
      return Ok(());
    };
    if line.is_empty() {
      break None;
    }
    match parse_due_date(&line) {
      Ok(date) => break Some(date),
      Err(err) => writeln!(output, "{err}")?,
    }
  };
  let category = match prompt(input, output, "Category (blank for none): ")? {
    Some(line) if !line.is_empty() => Some(line),
    Some(_) => None,
    None => return Ok(()),
  };
  match store.add(&description, priority, due_date.as_deref(), category.as_deref()) {
    Ok(_) => writeln!(output, "\nThe task \"{description}\" has been added to your list.")?,
    Err(StoreError::Io(err)) => writeln!(
      output,
      "\nThe task was added, but saving failed: {err}. The change is kept in memory only."
    )?,
    Err(err) => writeln!(output, "\n{err}")?,
  }
  Ok(())
}

fn view_tasks<P: Persist, W: Write>(
  store: &TaskStore<P>,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  if store.count() == 0 {
    writeln!(output, "\nThe task list is empty.")?;
    return Ok(());
  }
  writeln!(output, "\nYour Tasks:")?;
  for (index, task) in store.list() {
    write_task(output, index, task)?;
  }
  Ok(())
}

fn write_task<W: Write>(output: &mut W, index: usize, task: &Task) -> Result<(), IoError> {
  writeln!(
    output,
    "{}. {}, Completed: {}, Priority: {}, Due: {}, Category: {}",
    index,
    task.description,
    if task.completed { "Yes" } else { "No" },
    task
      .priority
      .map_or_else(|| "None".to_owned(), |priority| priority.to_string()),
    task.due_date.as_deref().unwrap_or("None"),
    task.category.as_deref().unwrap_or("None"),
  )
}

fn mark_complete<P: Persist, R: BufRead, W: Write>(
  store: &mut TaskStore<P>,
  input: &mut R,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  if store.count() == 0 {
    writeln!(output, "\nNo tasks to mark as complete.")?;
    return Ok(());
  }
  view_tasks(store, output)?;
  let indices = loop {
    let Some(line) = prompt(
      input,
      output,
      "Enter the numbers of the tasks to mark as complete (0 to cancel): ",
    )?
    else {
      return Ok(());
    };
    match parse_indices(&line) {
      Some(indices) if !indices.is_empty() => break indices,
      _ => writeln!(output, "Invalid input. Please enter task numbers separated by spaces.")?,
    }
  };
  match store.set_completed(&indices, true) {
    Ok(()) => writeln!(output, "\nThe selected tasks have been marked as complete.")?,
    Err(StoreError::Canceled) => writeln!(output, "\nCanceled. No tasks were changed.")?,
    Err(StoreError::Io(err)) => writeln!(
      output,
      "\nTasks were updated, but saving failed: {err}. The change is kept in memory only."
    )?,
    Err(err) => writeln!(output, "\n{err}")?,
  }
  Ok(())
}

fn parse_indices(line: &str) -> Option<Vec<usize>> {
  line
    .replace(',', " ")
    .split_whitespace()
    .map(|token| token.parse().ok())
    .collect()
}

fn delete_task<P: Persist, R: BufRead, W: Write>(
  store: &mut TaskStore<P>,
  input: &mut R,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  if store.count() == 0 {
    writeln!(output, "\nNo tasks to delete.")?;
    return Ok(());
  }
  view_tasks(store, output)?;
  let (index, description) = loop {
    let Some(line) = prompt(
      input,
      output,
      "Enter the number of the task you would like to delete: ",
    )?
    else {
      return Ok(());
    };
    match line.parse::<usize>() {
      Ok(index) => match store.get(index) {
        Ok(task) => break (index, task.description.clone()),
        Err(err) => writeln!(output, "{err}")?,
      },
      Err(_) => writeln!(output, "Invalid input. Please enter a valid number.")?,
    }
  };
  let Some(answer) = prompt(input, output, &format!("Delete \"{description}\"? (y/n): "))? else {
    return Ok(());
  };
  if answer.eq_ignore_ascii_case("y") {
    match store.delete(index) {
      Ok(task) => writeln!(output, "\nThe task \"{}\" has been deleted.", task.description)?,
      Err(StoreError::Io(err)) => writeln!(
        output,
        "\nThe task was deleted, but saving failed: {err}. The change is kept in memory only."
      )?,
      Err(err) => writeln!(output, "\n{err}")?,
    }
  } else {
    writeln!(output, "\nDeletion canceled.")?;
  }
  Ok(())
}

fn edit_task<P: Persist, R: BufRead, W: Write>(
  store: &mut TaskStore<P>,
  input: &mut R,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  if store.count() == 0 {
    writeln!(output, "\nNo tasks to edit.")?;
    return Ok(());
  }
  view_tasks(store, output)?;
  let index = loop {
    let Some(line) = prompt(
      input,
      output,
      "Enter the number of the task you would like to edit: ",
    )?
    else {
      return Ok(());
    };
    match line.parse::<usize>() {
      Ok(index) if store.get(index).is_ok() => break index,
      Ok(index) => writeln!(output, "{}", StoreError::OutOfRange(index))?,
      Err(_) => writeln!(output, "Invalid input. Please enter a valid number.")?,
    }
  };
  let field = loop {
    let Some(line) = prompt(
      input,
      output,
      "Field to edit (description, priority, due date, category, completed): ",
    )?
    else {
      return Ok(());
    };
    match line.parse::<Field>() {
      Ok(field) => break field,
      Err(err) => writeln!(output, "{err}")?,
    }
  };
  let Some(value) = prompt(input, output, "New value: ")? else {
    return Ok(());
  };
  match store.edit(index, field, &value) {
    Ok(()) => writeln!(output, "\nThe task has been updated.")?,
    Err(StoreError::Io(err)) => writeln!(
      output,
      "\nThe task was updated, but saving failed: {err}. The change is kept in memory only."
    )?,
    Err(err) => writeln!(output, "\n{err}")?,
  }
  Ok(())
}

fn search_tasks<P: Persist, R: BufRead, W: Write>(
  store: &TaskStore<P>,
  input: &mut R,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  let query = loop {
    let Some(kind) = prompt(input, output, "Search by keyword or priority? (k/p): ")? else {
      return Ok(());
    };
    match kind.to_lowercase().as_str() {
      "k" | "keyword" => {
        let Some(word) = prompt(input, output, "Keyword: ")? else {
          return Ok(());
        };
        break SearchQuery::Keyword(word);
      }
      "p" | "priority" => {
        let Some(line) = prompt(input, output, "Priority (High/Medium/Low): ")? else {
          return Ok(());
        };
        match line.parse::<Priority>() {
          Ok(priority) => break SearchQuery::Priority(priority),
          Err(err) => writeln!(output, "{err}")?,
        }
      }
      _ => writeln!(output, "Please answer k or p.")?,
    }
  };
  let matches = store.search(&query);
  if matches.is_empty() {
    writeln!(output, "\nNo matching tasks found.")?;
  } else {
    writeln!(output, "\nMatching tasks:")?;
    for (index, task) in matches {
      write_task(output, index, task)?;
    }
  }
  Ok(())
}

fn show_statistics<P: Persist, W: Write>(
  store: &TaskStore<P>,
  output: &mut W,
) -> Result<(), Box<dyn Error>> {
  match store.statistics() {
    None => writeln!(output, "\nThe task list is empty. No statistics to show.")?,
    Some(stats) => {
      writeln!(output, "\nTask Statistics:")?;
      writeln!(output, "Total tasks: {}", stats.total)?;
      writeln!(
        output,
        "Completed: {} ({:.1}%)",
        stats.completed_count, stats.percent_complete
      )?;
      writeln!(output, "High priority: {}", stats.high_count)?;
      writeln!(output, "Medium priority: {}", stats.medium_count)?;
      writeln!(output, "Low priority: {}", stats.low_count)?;
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::run_menu;
  use crate::store::{FailingSave, MemPersist, Persist, Priority, TaskStore};

  fn run_session<P: Persist>(store: &mut TaskStore<P>, input: &str) -> String {
    let mut output = Vec::new();
    run_menu(store, &mut input.as_bytes(), &mut output).unwrap();
    String::from_utf8(output).unwrap()
  }

  fn empty_store() -> TaskStore<MemPersist> {
    TaskStore::load(MemPersist::new())
  }

  #[test]
  fn add_view_complete_statistics_flow() {
    let mut store = empty_store();
    let output = run_session(
      &mut store,
      "1\nWrite report\nhigh\n2026-09-05\nWork\n2\n3\n1\n7\n8\n",
    );
    assert!(output.contains("The task \"Write report\" has been added to your list."));
    assert!(output
      .contains("1. Write report, Completed: No, Priority: High, Due: 2026-09-05, Category: Work"));
    assert!(output.contains("The selected tasks have been marked as complete."));
    assert!(output.contains("Total tasks: 1"));
    assert!(output.contains("Completed: 1 (100.0%)"));
    assert!(output.contains("Exiting To-Do List application. Goodbye!"));
    assert!(store.get(1).unwrap().completed);
  }

  #[test]
  fn add_retries_until_description_is_non_empty() {
    let mut store = empty_store();
    let output = run_session(&mut store, "1\n\nBuy milk\n\n\n\n8\n");
    assert!(output.contains("Task description cannot be empty. Please try again."));
    assert!(output.contains("The task \"Buy milk\" has been added to your list."));
    assert_eq!(store.count(), 1);
  }

  #[test]
  fn absent_optional_fields_render_as_none() {
    let mut store = empty_store();
    let output = run_session(&mut store, "1\nBuy milk\n\n\n\n2\n8\n");
    assert!(
      output.contains("1. Buy milk, Completed: No, Priority: None, Due: None, Category: None")
    );
  }

  #[test]
  fn zero_sentinel_cancels_marking_complete() {
    let mut store = empty_store();
    store.add("Write report", None, None, None).unwrap();
    store.add("Buy milk", None, None, None).unwrap();
    let output = run_session(&mut store, "3\n0 2\n8\n");
    assert!(output.contains("Canceled. No tasks were changed."));
    assert!(store.list().all(|(_, task)| !task.completed));
  }

  #[test]
  fn delete_requires_confirmation() {
    let mut store = empty_store();
    store.add("Write report", None, None, None).unwrap();
    let output = run_session(&mut store, "4\n1\nn\n8\n");
    assert!(output.contains("Delete \"Write report\"? (y/n): "));
    assert!(output.contains("Deletion canceled."));
    assert_eq!(store.count(), 1);

    let output = run_session(&mut store, "4\n1\ny\n8\n");
    assert!(output.contains("The task \"Write report\" has been deleted."));
    assert_eq!(store.count(), 0);
  }

  #[test]
  fn edit_changes_a_field() {
    let mut store = empty_store();
    store.add("Write report", None, None, None).unwrap();
    let output = run_session(&mut store, "5\n1\npriority\nlow\n8\n");
    assert!(output.contains("The task has been updated."));
    assert_eq!(store.get(1).unwrap().priority, Some(Priority::Low));
  }

  #[test]
  fn search_by_keyword_lists_only_matches() {
    let mut store = empty_store();
    store.add("Write report", None, None, None).unwrap();
    store.add("Buy milk", None, None, None).unwrap();
    let output = run_session(&mut store, "6\nk\nreport\n8\n");
    assert!(output.contains("Matching tasks:"));
    assert!(output.contains("1. Write report, "));
    assert!(!output.contains("2. Buy milk, "));
  }

  #[test]
  fn search_by_priority_lists_exact_matches() {
    let mut store = empty_store();
    store.add("Write report", Some(Priority::High), None, None).unwrap();
    store.add("Buy milk", Some(Priority::Low), None, None).unwrap();
    let output = run_session(&mut store, "6\np\nhigh\n8\n");
    assert!(output.contains("1. Write report, "));
    assert!(!output.contains("2. Buy milk, "));
  }

  #[test]
  fn save_failure_warns_change_is_in_memory_only() {
    let mut store = TaskStore::load(FailingSave);
    let output = run_session(&mut store, "1\nWrite report\n\n\n\n8\n");
    assert!(output.contains("The task was added, but saving failed"));
    assert!(output.contains("The change is kept in memory only."));
    assert_eq!(store.get(1).unwrap().description, "Write report");
  }

  #[test]
  fn statistics_on_empty_list_reports_no_data() {
    let mut store = empty_store();
    let output = run_session(&mut store, "7\n8\n");
    assert!(output.contains("The task list is empty. No statistics to show."));
  }

  #[test]
  fn invalid_menu_choice_reprompts() {
    let mut store = empty_store();
    let output = run_session(&mut store, "9\n8\n");
    assert!(output.contains("Invalid option. Please enter a number between 1 and 8."));
    assert!(output.contains("Exiting To-Do List application. Goodbye!"));
  }
}
