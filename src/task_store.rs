use crate::types::Task;
use crate::utils::parse_stamp;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct TaskStore {
    file_path: PathBuf,
}

impl TaskStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn load(&self) -> Result<Vec<Task>, String> {
        let raw = match fs::read_to_string(&self.file_path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.to_string()),
        };
        Ok(raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_line)
            .collect())
    }

    pub fn save(&self, tasks: &[Task]) -> Result<(), String> {
        let lines: Vec<String> = tasks.iter().map(render_line).collect();
        let output = if lines.is_empty() {
            String::new()
        } else {
            format!("{}\n", lines.join("\n"))
        };
        fs::write(&self.file_path, output).map_err(|err| err.to_string())
    }
}

// A stored line is either `<description>, <stamp>` or a plain description.
// The split takes the last ", " so descriptions containing the separator
// still pair with their stamp; a line with no valid stamp suffix is kept
// verbatim as a description-only task.
fn parse_line(line: &str) -> Task {
    if let Some((description, stamp)) = line.rsplit_once(", ") {
        if parse_stamp(stamp).is_some() {
            return Task::new(description, stamp.to_string());
        }
    }
    Task::bare(line)
}

fn render_line(task: &Task) -> String {
    match &task.created_at {
        Some(stamp) => format!("{}, {stamp}", task.description),
        None => task.description.clone(),
    }
}
