//! In-memory task store.
//!
//! Holds an ordered snapshot of tasks and dependency edges behind a tokio
//! `RwLock`. When created from a JSONL file it remembers the path,
//! [`TaskStore::save`] writes the snapshot back atomically and
//! [`TaskStore::refresh`] picks up changes other processes saved.

use super::TaskStore;
use super::jsonl::{load_from_jsonl, save_to_jsonl};
use crate::domain::{BoardId, DependencyEdge, TaskId, TaskNode};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Snapshot data guarded by the store lock.
#[derive(Debug, Default, Clone)]
pub(super) struct StoreState {
    pub(super) tasks: Vec<TaskNode>,
    pub(super) edges: Vec<DependencyEdge>,
}

impl StoreState {
    fn contains(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|task| &task.id == id)
    }

    fn board_members(&self, board: &BoardId) -> HashSet<&TaskId> {
        self.tasks
            .iter()
            .filter(|task| task.board_id.as_ref() == Some(board))
            .map(|task| &task.id)
            .collect()
    }
}

/// Thread-safe in-memory [`TaskStore`].
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    state: RwLock<StoreState>,
    path: Option<PathBuf>,
}

impl InMemoryTaskStore {
    /// Create an empty store with no backing file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given snapshot.
    ///
    /// Edges are kept as given, even if they reference unknown tasks; the
    /// graph loader reports those as dangling references.
    #[must_use]
    pub fn from_snapshot(tasks: Vec<TaskNode>, edges: Vec<DependencyEdge>) -> Self {
        Self {
            state: RwLock::new(StoreState { tasks, edges }),
            path: None,
        }
    }

    /// Persist to `path` whenever [`TaskStore::save`] is called.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Clone the full snapshot.
    pub(super) async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_tasks(&self, board: Option<&BoardId>) -> Result<Vec<TaskNode>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|task| board.is_none() || task.board_id.as_ref() == board)
            .cloned()
            .collect())
    }

    async fn get_tasks(&self, ids: &[TaskId]) -> Result<Vec<TaskNode>> {
        let wanted: HashSet<&TaskId> = ids.iter().collect();
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|task| wanted.contains(&task.id))
            .cloned()
            .collect())
    }

    async fn list_dependencies(&self, board: Option<&BoardId>) -> Result<Vec<DependencyEdge>> {
        let state = self.state.read().await;
        let Some(board) = board else {
            return Ok(state.edges.clone());
        };

        let members = state.board_members(board);
        Ok(state
            .edges
            .iter()
            .filter(|edge| members.contains(&edge.task_id) || members.contains(&edge.depends_on_id))
            .cloned()
            .collect())
    }

    async fn insert_dependency(&self, edge: DependencyEdge) -> Result<()> {
        let mut state = self.state.write().await;

        for id in [&edge.task_id, &edge.depends_on_id] {
            if !state.contains(id) {
                return Err(Error::TaskNotFound(id.clone()));
            }
        }
        if state
            .edges
            .iter()
            .any(|existing| existing.connects(&edge.task_id, &edge.depends_on_id))
        {
            return Err(Error::DuplicateDependency {
                from: edge.task_id,
                to: edge.depends_on_id,
            });
        }

        state.edges.push(edge);
        Ok(())
    }

    async fn delete_dependency(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<DependencyEdge> {
        let mut state = self.state.write().await;
        let position = state
            .edges
            .iter()
            .position(|edge| edge.connects(task_id, depends_on_id))
            .ok_or_else(|| Error::DependencyNotFound {
                from: task_id.clone(),
                to: depends_on_id.clone(),
            })?;
        Ok(state.edges.remove(position))
    }

    async fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_to_jsonl(self, path).await,
            None => Ok(()),
        }
    }

    async fn refresh(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let fresh = match load_from_jsonl(path).await {
            Ok((fresh, warnings)) => {
                for warning in &warnings {
                    warn!(path = %path.display(), "{warning}");
                }
                fresh
            }
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Data file missing, keeping snapshot");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        *self.state.write().await = fresh.state.into_inner();
        Ok(())
    }
}
