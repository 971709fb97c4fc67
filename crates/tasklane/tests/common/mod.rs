//! Common test utilities shared across integration tests.

use std::path::Path;
use std::process::{Command, Output};

/// Three tasks on one board: `build` depends on `design`, `ship` on `build`.
pub const SAMPLE_TASKS: &str = concat!(
    r#"{"id":"design","title":"Design","status":"todo","priority":2,"estimated_hours":2.0,"board_id":"core"}"#,
    "\n",
    r#"{"id":"build","title":"Build","status":"todo","priority":3,"estimated_hours":3.0,"board_id":"core","dependencies":[{"depends_on_id":"design","dep_type":"blocks","created_at":"2026-01-05T10:00:00Z"}]}"#,
    "\n",
    r#"{"id":"ship","title":"Ship","status":"todo","estimated_hours":1.0,"board_id":"core","dependencies":[{"depends_on_id":"build","dep_type":"blocks","created_at":"2026-01-05T10:00:00Z"}]}"#,
    "\n",
    r#"{"id":"docs","title":"Docs","status":"todo","estimated_hours":0.5,"board_id":"core","dependencies":[{"depends_on_id":"build","dep_type":"blocks","created_at":"2026-01-05T10:00:00Z"}]}"#,
    "\n",
);

/// Run the tasklane binary in the specified directory with colors disabled
pub fn run_tasklane_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tasklane"))
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("TASKLANE_ASCII")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute tasklane binary")
}

/// Initialize a workspace in `dir` and fill its data file with `tasks`.
pub fn init_with_tasks(dir: &Path, tasks: &str) {
    let output = run_tasklane_in_dir(dir, &["init", "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize tasklane: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    std::fs::write(dir.join(".tasklane/tasks.jsonl"), tasks).expect("Failed to write tasks");
}

/// Parse stdout as JSON.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON")
}
