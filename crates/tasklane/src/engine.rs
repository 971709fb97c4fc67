//! Entry point tying the store, loader, analyses and renderer together.
//!
//! Every query and write first refreshes the store, so changes saved by
//! another process are seen. Read queries then load their own graph
//! snapshot and can run concurrently. Dependency writes are serialized: the
//! engine holds its write lock across refresh, load, cycle check, insert
//! and save, so two concurrent inserts cannot each pass the check and
//! together close a loop.

use crate::analysis::{CriticalPath, Impact, analyze_impact, find_critical_path};
use crate::domain::{BoardId, DependencyEdge, NewDependency, TaskId};
use crate::error::{Error, Result};
use crate::graph::cycle::check_dependency;
use crate::graph::{GraphLoader, LoadOptions, TaskGraph};
use crate::render::{RenderFormat, RenderOptions, render};
use crate::store::TaskStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Dependency graph engine over a task store.
pub struct Engine {
    store: Arc<dyn TaskStore>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("store", &"<dyn TaskStore>")
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine over `store`.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Refresh the store, then load a graph snapshot.
    ///
    /// # Errors
    ///
    /// Returns store errors or see [`GraphLoader::load`].
    pub async fn load_graph(&self, options: &LoadOptions) -> Result<TaskGraph> {
        {
            // Never refresh in the middle of a write that has not been saved yet.
            let _guard = self.write_lock.lock().await;
            self.store.refresh().await?;
        }
        GraphLoader::new(self.store.as_ref()).load(options).await
    }

    /// Critical path of open work, optionally scoped to one board.
    ///
    /// # Errors
    ///
    /// Returns loader errors or `Error::GraphCorrupted`.
    pub async fn critical_path(&self, board: Option<&BoardId>) -> Result<CriticalPath> {
        let graph = self
            .load_graph(&LoadOptions::for_board(board.cloned()))
            .await?;
        find_critical_path(&graph)
    }

    /// Transitive dependents of a task, over the whole store.
    ///
    /// # Errors
    ///
    /// Returns loader errors or `Error::TaskNotFound`.
    pub async fn impact(&self, task_id: &TaskId) -> Result<Impact> {
        let graph = self.load_graph(&LoadOptions::default()).await?;
        analyze_impact(&graph, task_id)
    }

    /// Render the graph as text.
    ///
    /// DOT output also draws informational links, so they are loaded for it.
    ///
    /// # Errors
    ///
    /// Returns loader errors or any error from [`render`].
    pub async fn visualize(&self, options: &RenderOptions) -> Result<String> {
        let load = LoadOptions {
            board: options.board.clone(),
            include_informational: options.format == RenderFormat::Dot,
        };
        let graph = self.load_graph(&load).await?;
        render(&graph, options)
    }

    /// Record a dependency after checking it against the current graph.
    ///
    /// # Errors
    ///
    /// - `Error::SelfDependency` if both ends are the same task
    /// - `Error::TaskNotFound` if either task doesn't exist
    /// - `Error::CycleDetected` if a `blocks` edge would close a loop
    /// - `Error::DuplicateDependency` if the pair is already linked
    /// - Store errors; a failed save rolls the insert back
    pub async fn add_dependency(&self, request: NewDependency) -> Result<DependencyEdge> {
        if request.task_id == request.depends_on_id {
            return Err(Error::SelfDependency(request.task_id));
        }

        let _guard = self.write_lock.lock().await;

        self.store.refresh().await?;
        let graph = GraphLoader::new(self.store.as_ref())
            .load(&LoadOptions::default())
            .await?;
        if let Err(err) = check_dependency(&graph, &request) {
            if let Error::CycleDetected { path, .. } = &err {
                warn!(
                    task = %request.task_id,
                    depends_on = %request.depends_on_id,
                    cycle = %crate::error::format_cycle(path),
                    "Rejected dependency"
                );
            }
            return Err(err);
        }

        let edge = DependencyEdge::new(
            request.task_id,
            request.depends_on_id,
            request.dep_type,
        );
        self.store.insert_dependency(edge.clone()).await?;

        if let Err(err) = self.store.save().await {
            warn!(error = %err, "Save failed, rolling back dependency");
            self.store
                .delete_dependency(&edge.task_id, &edge.depends_on_id)
                .await?;
            return Err(err);
        }

        info!(
            task = %edge.task_id,
            depends_on = %edge.depends_on_id,
            dep_type = %edge.dep_type,
            "Added dependency"
        );
        Ok(edge)
    }

    /// Remove the dependency `task_id -> depends_on_id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if there is no such edge, or a
    /// store error.
    pub async fn remove_dependency(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<DependencyEdge> {
        let _guard = self.write_lock.lock().await;

        self.store.refresh().await?;
        let edge = self.store.delete_dependency(task_id, depends_on_id).await?;
        if let Err(err) = self.store.save().await {
            warn!(error = %err, "Save failed, restoring dependency");
            self.store.insert_dependency(edge).await?;
            return Err(err);
        }

        info!(
            task = %edge.task_id,
            depends_on = %edge.depends_on_id,
            dep_type = %edge.dep_type,
            "Removed dependency"
        );
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyType, TaskNode};
    use crate::store::InMemoryTaskStore;

    fn engine() -> Engine {
        let store = InMemoryTaskStore::from_snapshot(
            vec![
                TaskNode::new("a", "A").with_board("x"),
                TaskNode::new("b", "B").with_board("x"),
                TaskNode::new("c", "C").with_board("y"),
            ],
            vec![DependencyEdge::new("b", "a", DependencyType::Blocks)],
        );
        Engine::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_add_dependency_then_query() {
        let engine = engine();
        engine
            .add_dependency(NewDependency::new("c", "b", DependencyType::Blocks))
            .await
            .unwrap();

        let path = engine.critical_path(None).await.unwrap();
        let ids: Vec<&str> = path.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let impact = engine.impact(&TaskId::new("a")).await.unwrap();
        assert_eq!(impact.total_impact, 2);
    }

    #[tokio::test]
    async fn test_rejected_dependency_is_not_stored() {
        let engine = engine();
        let err = engine
            .add_dependency(NewDependency::new("a", "b", DependencyType::Blocks))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
        assert_eq!(engine.store().list_dependencies(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_self_dependency_for_unknown_task() {
        let engine = engine();
        let err = engine
            .add_dependency(NewDependency::new("zz", "zz", DependencyType::RelatesTo))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SelfDependency(_)));
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected() {
        let engine = engine();
        let err = engine
            .add_dependency(NewDependency::new("b", "a", DependencyType::RelatesTo))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateDependency { .. }));
    }

    #[tokio::test]
    async fn test_remove_dependency() {
        let engine = engine();
        let removed = engine
            .remove_dependency(&TaskId::new("b"), &TaskId::new("a"))
            .await
            .unwrap();
        assert_eq!(removed.dep_type, DependencyType::Blocks);

        let err = engine
            .remove_dependency(&TaskId::new("b"), &TaskId::new("a"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyNotFound { .. }));
    }

    #[tokio::test]
    async fn test_visualize_board() {
        let engine = engine();
        let options = RenderOptions {
            board: Some(BoardId::new("y")),
            ..RenderOptions::new(RenderFormat::Tree)
        };
        let text = engine.visualize(&options).await.unwrap();
        assert_eq!(text, "○ C\n");
    }
}
