mod session;
mod session_log;
mod task_store;
mod types;
mod utils;

use crate::session::run_session;
use crate::session_log::SessionLog;
use crate::task_store::TaskStore;
use crate::utils::{generate_id, parse_args, resolve_state_dir, safe_trim, ParsedArgs};
use std::env;
use std::io;

fn main() {
    let argv: Vec<String> = env::args().skip(1).collect();
    let args = parse_args(&argv);
    if args.flags.contains("help") || args.flags.contains("h") {
        print_help();
        return;
    }

    let file_path = args
        .values
        .get("file")
        .map(|v| safe_trim(Some(v)))
        .filter(|v| !v.is_empty())
        .or_else(|| {
            env::var("TASK_TRACKER_FILE")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| "tasks.txt".to_string());

    let store = TaskStore::new(&file_path);
    let tasks = store.load().expect("failed to read task file");

    let log = resolve_session_log(&args);

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(err) = run_session(
        &mut stdin.lock(),
        &mut stdout.lock(),
        &store,
        log.as_ref(),
        tasks,
    ) {
        eprintln!("[task-tracker] session crashed: {err}");
        std::process::exit(1);
    }
}

fn resolve_session_log(args: &ParsedArgs) -> Option<SessionLog> {
    if env::var("TASK_TRACKER_DISABLE_LOG").ok().as_deref() == Some("1") {
        return None;
    }
    let log_path = args
        .values
        .get("log")
        .map(|v| safe_trim(Some(v)))
        .filter(|v| !v.is_empty())
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| resolve_state_dir().join("session-log.jsonl"));
    Some(SessionLog::new(log_path, generate_id("session")))
}

fn print_help() {
    println!(
        "Usage: task-tracker-rs [--file <path>] [--log <path>]\n\nOptions:\n  --file <path>  Task file path (default tasks.txt in the working directory)\n  --log <path>   Session journal path (default <state dir>/session-log.jsonl)\n  --help         Show help\n\nEnvironment:\n  TASK_TRACKER_FILE         Task file path when --file is not given\n  TASK_TRACKER_STATE_ROOT   State directory root (default ~/.task-tracker)\n  TASK_TRACKER_DISABLE_LOG  Set to 1 to disable the session journal"
    );
}
