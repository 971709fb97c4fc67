//! Error types for tasklane operations.

use crate::domain::TaskId;
use std::io;
use thiserror::Error;

/// The error type for tasklane operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced task is not part of the loaded graph or store.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// A dependency edge points at a task that does not exist in storage.
    #[error("Dependency {task} -> {missing} references a task that does not exist")]
    DanglingReference {
        /// Task that owns the edge
        task: TaskId,
        /// The missing endpoint
        missing: TaskId,
    },

    /// A task was asked to depend on itself.
    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// Adding the dependency would close a loop of `blocks` edges.
    #[error("Adding {from} -> {to} would create a cycle: {}", format_cycle(.path))]
    CycleDetected {
        /// The dependent task of the rejected edge
        from: TaskId,
        /// The dependency of the rejected edge
        to: TaskId,
        /// The loop that the edge would have formed, starting and ending at `from`
        path: Vec<TaskId>,
    },

    /// The dependency is already recorded.
    #[error("Dependency already exists: {from} -> {to}")]
    DuplicateDependency {
        /// The dependent task
        from: TaskId,
        /// The dependency
        to: TaskId,
    },

    /// The dependency to remove is not recorded.
    #[error("Dependency not found: {from} -> {to}")]
    DependencyNotFound {
        /// The dependent task
        from: TaskId,
        /// The dependency
        to: TaskId,
    },

    /// Topological ordering failed, meaning a cycle reached storage.
    #[error("Dependency graph is corrupted: {} task(s) could not be ordered ({})", .unordered.len(), format_ids(.unordered))]
    GraphCorrupted {
        /// Tasks left over after topological ordering
        unordered: Vec<TaskId>,
    },

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

pub(crate) fn format_cycle(path: &[TaskId]) -> String {
    path.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_ids(ids: &[TaskId]) -> String {
    ids.iter().map(TaskId::as_str).collect::<Vec<_>>().join(", ")
}

/// A specialized Result type for tasklane operations.
pub type Result<T> = std::result::Result<T, Error>;
