//! Builds a [`TaskGraph`] from a task store snapshot.
//!
//! Loading is read-only: one round trip for tasks and one for edges, issued
//! concurrently, plus one batched lookup when a board filter pulls in
//! endpoints that live on other boards.

use super::TaskGraph;
use crate::domain::{BoardId, DependencyEdge, TaskId, TaskNode};
use crate::error::{Error, Result};
use crate::store::TaskStore;
use std::collections::BTreeSet;
use tracing::{debug, error, warn};

/// Options controlling what the loader pulls from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Only load tasks on this board (plus out-of-board endpoints of their edges)
    pub board: Option<BoardId>,

    /// Also keep `relates_to` / `duplicates` edges (for rendering only)
    pub include_informational: bool,
}

impl LoadOptions {
    /// Options scoped to an optional board, scheduling edges only.
    #[must_use]
    pub fn for_board(board: Option<BoardId>) -> Self {
        Self {
            board,
            include_informational: false,
        }
    }
}

/// Reads tasks and dependency edges from a store and builds a graph.
pub struct GraphLoader<'a> {
    store: &'a dyn TaskStore,
}

impl<'a> GraphLoader<'a> {
    /// Create a loader reading from `store`.
    pub fn new(store: &'a dyn TaskStore) -> Self {
        Self { store }
    }

    /// Load a fresh graph.
    ///
    /// # Errors
    ///
    /// - `Error::DanglingReference` if an edge names a task that does not
    ///   exist in storage
    /// - `Error::SelfDependency` if a stored edge links a task to itself
    /// - Any error surfaced by the store
    pub async fn load(&self, options: &LoadOptions) -> Result<TaskGraph> {
        let board = options.board.as_ref();
        let (tasks, edges) = futures::try_join!(
            self.store.list_tasks(board),
            self.store.list_dependencies(board)
        )?;

        let mut graph = TaskGraph::new();
        for task in tasks {
            let id = task.id.clone();
            if !graph.add_task(sanitize(task)) {
                warn!(task = %id, "Duplicate task in snapshot, keeping first occurrence");
            }
        }

        let edges: Vec<DependencyEdge> = edges
            .into_iter()
            .filter(|edge| options.include_informational || edge.dep_type.is_scheduling())
            .filter(|edge| {
                board.is_none() || graph.contains(&edge.task_id) || graph.contains(&edge.depends_on_id)
            })
            .collect();

        if board.is_some() {
            self.attach_placeholders(&mut graph, &edges).await?;
        }

        for edge in &edges {
            if let Err(err) = graph.add_dependency(&edge.task_id, &edge.depends_on_id, edge.dep_type)
            {
                match &err {
                    Error::DanglingReference { task, missing } => {
                        error!(task = %task, missing = %missing, "Dependency references a missing task");
                    }
                    Error::SelfDependency(task) => {
                        error!(task = %task, "Stored dependency points at its own task");
                    }
                    _ => {}
                }
                return Err(err);
            }
        }

        debug!(
            board = ?options.board,
            tasks = graph.len(),
            edges = graph.edges().count(),
            placeholders = graph.tasks().filter(|t| graph.is_placeholder(&t.id)).count(),
            "Loaded dependency graph"
        );
        Ok(graph)
    }

    /// Fetch endpoints that are outside the loaded board and add them as
    /// placeholder nodes. Ids the store does not know stay missing.
    async fn attach_placeholders(&self, graph: &mut TaskGraph, edges: &[DependencyEdge]) -> Result<()> {
        let missing: Vec<TaskId> = edges
            .iter()
            .flat_map(|edge| [&edge.task_id, &edge.depends_on_id])
            .filter(|id| !graph.contains(id))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        for task in self.store.get_tasks(&missing).await? {
            if missing.contains(&task.id) {
                graph.add_placeholder(sanitize(task));
            }
        }
        Ok(())
    }
}

/// Drop estimates that cannot be used as durations.
fn sanitize(mut task: TaskNode) -> TaskNode {
    if !task.has_valid_estimate() {
        warn!(task = %task.id, estimate = ?task.estimated_hours, "Ignoring invalid estimate");
        task.estimated_hours = None;
    }
    task
}
