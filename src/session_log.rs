use crate::utils::{ensure_dir, generate_id, now_iso};
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const MAX_LOG_LINES: usize = 2000;

pub struct SessionLog {
    file_path: PathBuf,
    session_id: String,
}

impl SessionLog {
    pub fn new(file_path: impl Into<PathBuf>, session_id: String) -> Self {
        Self {
            file_path: file_path.into(),
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    // Best effort: a broken journal must never disturb the session.
    pub fn append(&self, action: &str, payload: Value) {
        let mut entry = Map::new();
        entry.insert("id".to_string(), Value::String(generate_id("event")));
        entry.insert("ts".to_string(), Value::String(now_iso()));
        entry.insert(
            "sessionId".to_string(),
            Value::String(self.session_id.clone()),
        );
        entry.insert("action".to_string(), Value::String(action.to_string()));
        if let Value::Object(fields) = payload {
            for (key, value) in fields {
                entry.insert(key, value);
            }
        }
        ensure_parent_dir(&self.file_path);
        trim_log(&self.file_path, MAX_LOG_LINES - 1);
        let _ = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
            .and_then(|mut file| writeln!(file, "{}", Value::Object(entry)));
    }
}

fn ensure_parent_dir(file_path: &Path) {
    if let Some(parent) = file_path.parent() {
        let _ = ensure_dir(parent);
    }
}

fn trim_log(file_path: &Path, max_lines: usize) {
    let content = match fs::read_to_string(file_path) {
        Ok(content) => content,
        Err(_) => return,
    };
    let mut lines: Vec<&str> = content
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() <= max_lines {
        return;
    }
    lines = lines.split_off(lines.len() - max_lines);
    let output = if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    };
    let _ = fs::write(file_path, output);
}
