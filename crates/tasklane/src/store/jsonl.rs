//! JSONL persistence for the in-memory store.
//!
//! Each line holds one task with its outgoing dependencies embedded:
//!
//! ```text
//! {"id":"api-1","title":"Schema","status":"todo","priority":2,"dependencies":[]}
//! {"id":"web-1","title":"Login","status":"todo","dependencies":[{"depends_on_id":"api-1","dep_type":"blocks","created_at":"2026-10-01T09:00:00Z"}]}
//! ```

use super::InMemoryTaskStore;
use crate::domain::{DependencyEdge, DependencyType, TaskId, TaskNode};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::debug;

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal. Loading continues and the affected data is either
/// skipped or kept as-is, depending on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// Line that couldn't be parsed as a task record
    ///
    /// **Effect**: Line is skipped entirely.
    MalformedJson {
        /// 1-based line number in the file
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A second record with an ID already seen earlier in the file
    ///
    /// **Effect**: The later record and its dependencies are skipped.
    DuplicateTask {
        /// The repeated ID
        task_id: TaskId,
        /// 1-based line number of the skipped record
        line_number: usize,
    },

    /// Dependency that names its own task
    ///
    /// **Effect**: The edge is skipped and disappears on the next save.
    SelfDependency {
        /// The task that listed itself
        task_id: TaskId,
        /// 1-based line number of the record
        line_number: usize,
    },

    /// Dependency references a task that doesn't exist in the file
    ///
    /// **Effect**: The edge is kept; loading a graph over it fails with a
    /// dangling reference until the edge is removed.
    OrphanedDependency {
        /// The dependent task
        from: TaskId,
        /// The missing dependency
        to: TaskId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: skipped malformed record: {error}")
            }
            Self::DuplicateTask {
                task_id,
                line_number,
            } => write!(f, "line {line_number}: skipped duplicate task {task_id}"),
            Self::SelfDependency {
                task_id,
                line_number,
            } => write!(f, "line {line_number}: skipped dependency of {task_id} on itself"),
            Self::OrphanedDependency { from, to } => {
                write!(f, "dependency {from} -> {to} references a missing task")
            }
        }
    }
}

/// One line of the data file.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    #[serde(flatten)]
    task: TaskNode,

    #[serde(default)]
    dependencies: Vec<StoredDependency>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
struct StoredDependency {
    depends_on_id: TaskId,
    dep_type: DependencyType,
    created_at: DateTime<Utc>,
}

/// Load a store from a JSONL file.
///
/// The returned store remembers `path`, so [`super::TaskStore::save`]
/// writes back to the same file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read. Bad lines are
/// reported as [`LoadWarning`]s instead.
pub async fn load_from_jsonl(path: &Path) -> Result<(InMemoryTaskStore, Vec<LoadWarning>)> {
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();
    let mut edges = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: TaskRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if !seen.insert(record.task.id.clone()) {
            warnings.push(LoadWarning::DuplicateTask {
                task_id: record.task.id,
                line_number,
            });
            continue;
        }

        for dep in record.dependencies {
            if dep.depends_on_id == record.task.id {
                warnings.push(LoadWarning::SelfDependency {
                    task_id: record.task.id.clone(),
                    line_number,
                });
                continue;
            }
            edges.push(DependencyEdge {
                task_id: record.task.id.clone(),
                depends_on_id: dep.depends_on_id,
                dep_type: dep.dep_type,
                created_at: dep.created_at,
            });
        }
        tasks.push(record.task);
    }

    for edge in &edges {
        if !seen.contains(&edge.depends_on_id) {
            warnings.push(LoadWarning::OrphanedDependency {
                from: edge.task_id.clone(),
                to: edge.depends_on_id.clone(),
            });
        }
    }

    debug!(
        path = %path.display(),
        tasks = tasks.len(),
        edges = edges.len(),
        warnings = warnings.len(),
        "Loaded task data file"
    );

    let store = InMemoryTaskStore::from_snapshot(tasks, edges).with_path(path);
    Ok((store, warnings))
}

/// Save the store to a JSONL file with an atomic write.
///
/// Data goes to a `.tmp` sibling first and is renamed over `path` once
/// flushed. Dependencies are written sorted so repeated saves are stable.
/// Edges whose dependent task is unknown cannot be represented and are
/// not written.
///
/// # Errors
///
/// Returns an I/O or serialization error; the original file is left intact.
pub async fn save_to_jsonl(store: &InMemoryTaskStore, path: &Path) -> Result<()> {
    let snapshot = store.snapshot().await;

    let mut by_task: BTreeMap<&TaskId, Vec<StoredDependency>> = BTreeMap::new();
    for edge in &snapshot.edges {
        by_task
            .entry(&edge.task_id)
            .or_default()
            .push(StoredDependency {
                depends_on_id: edge.depends_on_id.clone(),
                dep_type: edge.dep_type,
                created_at: edge.created_at,
            });
    }

    let temp_path = path.with_extension("jsonl.tmp");
    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);

    for task in &snapshot.tasks {
        let mut dependencies = by_task.remove(&task.id).unwrap_or_default();
        dependencies.sort();

        let record = TaskRecord {
            task: task.clone(),
            dependencies,
        };
        let json = serde_json::to_string(&record)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    drop(writer);

    tokio::fs::rename(&temp_path, path).await?;
    debug!(path = %path.display(), tasks = snapshot.tasks.len(), "Saved task data file");
    Ok(())
}
