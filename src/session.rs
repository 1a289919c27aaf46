use crate::session_log::SessionLog;
use crate::task_store::TaskStore;
use crate::types::Task;
use crate::utils::now_stamp;
use serde_json::json;
use std::io::{self, BufRead, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuChoice {
    View,
    Add,
    Remove,
    Exit,
}

fn parse_choice(raw: &str) -> Option<MenuChoice> {
    match raw.trim() {
        "1" => Some(MenuChoice::View),
        "2" => Some(MenuChoice::Add),
        "3" => Some(MenuChoice::Remove),
        "4" => Some(MenuChoice::Exit),
        _ => None,
    }
}

// Drives the menu loop until the user picks Exit or the input reaches EOF.
// Returns the final in-memory list; every mutation is persisted before the
// next prompt is shown.
pub fn run_session<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    store: &TaskStore,
    log: Option<&SessionLog>,
    mut tasks: Vec<Task>,
) -> io::Result<Vec<Task>> {
    loop {
        print_menu(output)?;
        let choice = match prompt_choice(input, output)? {
            Some(choice) => choice,
            None => break,
        };
        match choice {
            MenuChoice::View => display_tasks(output, &tasks)?,
            MenuChoice::Add => {
                if !handle_add(input, output, store, log, &mut tasks)? {
                    break;
                }
            }
            MenuChoice::Remove => {
                if !handle_remove(input, output, store, log, &mut tasks)? {
                    break;
                }
            }
            MenuChoice::Exit => {
                writeln!(
                    output,
                    "Exiting. Your tasks are saved in {}. Have a great day!",
                    store.file_path().display()
                )?;
                if let Some(log) = log {
                    log.append("session_end", json!({ "count": tasks.len() }));
                }
                break;
            }
        }
    }
    Ok(tasks)
}

fn print_menu<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output)?;
    writeln!(output, "===== To-Do List Manager =====")?;
    writeln!(output, "1. View Tasks")?;
    writeln!(output, "2. Add Task")?;
    writeln!(output, "3. Remove Task")?;
    writeln!(output, "4. Exit")?;
    Ok(())
}

fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<MenuChoice>> {
    loop {
        let raw = match prompt_line(input, output, "Enter your choice (1/2/3/4): ")? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        if let Some(choice) = parse_choice(&raw) {
            return Ok(Some(choice));
        }
        writeln!(
            output,
            "Invalid choice, please try again. Valid choices are 1 (view tasks), 2 (add a task), 3 (remove a task) or 4 (exit)."
        )?;
    }
}

fn display_tasks<W: Write>(output: &mut W, tasks: &[Task]) -> io::Result<()> {
    if tasks.is_empty() {
        writeln!(
            output,
            "No tasks in your to-do list yet. Try adding one and check back here!"
        )?;
        return Ok(());
    }
    writeln!(output, "Tasks in your to-do list:")?;
    for (index, task) in tasks.iter().enumerate() {
        writeln!(output, "{}. {}", index + 1, task.label())?;
    }
    Ok(())
}

fn handle_add<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    store: &TaskStore,
    log: Option<&SessionLog>,
    tasks: &mut Vec<Task>,
) -> io::Result<bool> {
    let description = loop {
        let raw = match prompt_line(input, output, "Enter the new task: ")? {
            Some(raw) => raw,
            None => return Ok(false),
        };
        let trimmed = raw.trim().to_string();
        if trimmed.is_empty() {
            writeln!(output, "A task needs a description, please try again.")?;
            continue;
        }
        break trimmed;
    };
    let task = Task::new(description, now_stamp());
    tasks.push(task.clone());
    writeln!(output, "Task '{}' added to your to-do list!", task.description)?;
    persist(store, tasks);
    if let Some(log) = log {
        log.append("add_task", json!({ "task": task }));
    }
    Ok(true)
}

fn handle_remove<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    store: &TaskStore,
    log: Option<&SessionLog>,
    tasks: &mut Vec<Task>,
) -> io::Result<bool> {
    display_tasks(output, tasks)?;
    if tasks.is_empty() {
        // Nothing removable, so no prompt could ever be answered validly.
        return Ok(true);
    }
    let position = loop {
        let raw = match prompt_line(input, output, "Enter the task number to remove: ")? {
            Some(raw) => raw,
            None => return Ok(false),
        };
        match parse_position(&raw, tasks.len()) {
            Some(position) => break position,
            None => writeln!(output, "Invalid task number, please try again.")?,
        }
    };
    let removed = tasks.remove(position - 1);
    writeln!(
        output,
        "Task '{}' removed from your to-do list.",
        removed.description
    )?;
    persist(store, tasks);
    if let Some(log) = log {
        log.append("remove_task", json!({ "task": removed, "position": position }));
    }
    Ok(true)
}

fn parse_position(raw: &str, len: usize) -> Option<usize> {
    let value = raw.trim().parse::<usize>().ok()?;
    if (1..=len).contains(&value) {
        Some(value)
    } else {
        None
    }
}

fn persist(store: &TaskStore, tasks: &[Task]) {
    if let Err(err) = store.save(tasks) {
        eprintln!(
            "[task-tracker] failed to save {}: {err}",
            store.file_path().display()
        );
    }
}

fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn drive(store: &TaskStore, script: &str, tasks: Vec<Task>) -> (String, Vec<Task>) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        let final_tasks = run_session(&mut input, &mut output, store, None, tasks).unwrap();
        (String::from_utf8(output).unwrap(), final_tasks)
    }

    fn seeded(store: &TaskStore, descriptions: &[&str]) -> Vec<Task> {
        let tasks: Vec<Task> = descriptions.iter().map(|d| Task::bare(*d)).collect();
        store.save(&tasks).unwrap();
        tasks
    }

    #[test]
    fn exit_prints_farewell_and_stops() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let (output, tasks) = drive(&store, "4\n", Vec::new());
        assert!(output.contains("Have a great day!"));
        assert!(tasks.is_empty());
    }

    #[test]
    fn eof_ends_the_session_without_farewell() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let (output, _) = drive(&store, "", Vec::new());
        assert!(!output.contains("Have a great day!"));
    }

    #[test]
    fn add_persists_and_view_lists_the_task() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let (output, tasks) = drive(&store, "2\nbuy milk\n1\n4\n", Vec::new());
        assert!(output.contains("Task 'buy milk' added to your to-do list!"));
        assert!(output.contains("1. buy milk ("));

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "buy milk");
        assert!(tasks[0].created_at.is_some());

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, tasks);
    }

    #[test]
    fn blank_description_is_rejected_until_filled() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let (output, tasks) = drive(&store, "2\n   \nbuy milk\n4\n", Vec::new());
        assert!(output.contains("A task needs a description"));
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "buy milk");
    }

    #[test]
    fn invalid_menu_choice_reprompts() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let (output, _) = drive(&store, "7\nview\n4\n", Vec::new());
        assert_eq!(output.matches("Invalid choice, please try again.").count(), 2);
        assert!(output.contains("Have a great day!"));
    }

    #[test]
    fn view_on_empty_list_prints_the_no_tasks_message() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let (output, _) = drive(&store, "1\n4\n", Vec::new());
        assert!(output.contains("No tasks in your to-do list yet."));
    }

    #[test]
    fn remove_middle_task_keeps_relative_order() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let tasks = seeded(&store, &["a", "b", "c"]);
        let (output, remaining) = drive(&store, "3\n2\n4\n", tasks);
        assert!(output.contains("Task 'b' removed from your to-do list."));
        assert_eq!(remaining, vec![Task::bare("a"), Task::bare("c")]);
        assert_eq!(fs::read_to_string(store.file_path()).unwrap(), "a\nc\n");
    }

    #[test]
    fn out_of_range_numbers_reprompt_without_mutating() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let tasks = seeded(&store, &["a", "b"]);
        let (output, remaining) = drive(&store, "3\n5\nzero\n1\n4\n", tasks);
        assert_eq!(output.matches("Invalid task number, please try again.").count(), 2);
        assert_eq!(remaining, vec![Task::bare("b")]);
    }

    #[test]
    fn remove_on_empty_list_returns_to_menu() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let (output, tasks) = drive(&store, "3\n4\n", Vec::new());
        assert!(output.contains("No tasks in your to-do list yet."));
        assert!(!output.contains("Enter the task number to remove"));
        assert!(output.contains("Have a great day!"));
        assert!(tasks.is_empty());
    }

    #[test]
    fn mutations_are_journaled() {
        let dir = tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.txt"));
        let log_path = dir.path().join("session-log.jsonl");
        let log = SessionLog::new(&log_path, "session_test".to_string());

        let mut input = Cursor::new(b"2\nbuy milk\n3\n1\n4\n".to_vec());
        let mut output = Vec::new();
        run_session(&mut input, &mut output, &store, Some(&log), Vec::new()).unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        let entries: Vec<Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let actions: Vec<&str> = entries
            .iter()
            .map(|e| e["action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, vec!["add_task", "remove_task", "session_end"]);
        assert_eq!(entries[0]["task"]["description"], "buy milk");
        assert_eq!(entries[1]["position"], 1);
        assert_eq!(entries[2]["count"], 0);
    }
}
