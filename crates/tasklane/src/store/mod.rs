//! Task store abstraction.
//!
//! Tasks and boards are owned by an external store; the engine only reads
//! snapshots from it and writes dependency edges back. This module defines
//! the [`TaskStore`] contract the engine consumes, plus an in-memory
//! implementation with optional JSONL persistence used by the CLI, the MCP
//! server and the tests.
//!
//! # Architecture
//!
//! The trait is async so that database-backed stores can await their I/O,
//! and object-safe so callers can hold an `Arc<dyn TaskStore>`. Every method
//! takes `&self`; implementations use interior mutability for writes.
//!
//! # Example
//!
//! ```
//! use tasklane::domain::{DependencyEdge, DependencyType, TaskNode};
//! use tasklane::store::{InMemoryTaskStore, TaskStore};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = InMemoryTaskStore::from_snapshot(
//!         vec![TaskNode::new("a", "Design"), TaskNode::new("b", "Build")],
//!         vec![DependencyEdge::new("b", "a", DependencyType::Blocks)],
//!     );
//!
//!     let tasks = store.list_tasks(None).await?;
//!     assert_eq!(tasks.len(), 2);
//!     Ok(())
//! }
//! ```

use crate::domain::{BoardId, DependencyEdge, TaskId, TaskNode};
use crate::error::Result;
use async_trait::async_trait;

mod in_memory;
mod jsonl;

pub use in_memory::InMemoryTaskStore;
pub use jsonl::{LoadWarning, load_from_jsonl, save_to_jsonl};

/// Storage contract consumed by the dependency engine.
///
/// # Method Categories
///
/// - **Snapshot reads**: `list_tasks`, `get_tasks`, `list_dependencies`
/// - **Dependency writes**: `insert_dependency`, `delete_dependency`
/// - **Persistence**: `save`, `refresh`
///
/// # Consistency
///
/// Writes are not validated against the DAG invariant here. The engine
/// runs the cycle guard and the insert inside one critical section; a store
/// only has to reject unknown endpoints and duplicate pairs.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// List tasks in store order, optionally restricted to one board.
    async fn list_tasks(&self, board: Option<&BoardId>) -> Result<Vec<TaskNode>>;

    /// Fetch specific tasks. Unknown IDs are silently omitted.
    async fn get_tasks(&self, ids: &[TaskId]) -> Result<Vec<TaskNode>>;

    /// List dependency edges of every type.
    ///
    /// With a board, only edges with at least one endpoint on that board are
    /// returned. The other endpoint may live anywhere, or nowhere.
    async fn list_dependencies(&self, board: Option<&BoardId>) -> Result<Vec<DependencyEdge>>;

    /// Record a dependency edge.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if either endpoint doesn't exist
    /// - `Error::DuplicateDependency` if the pair already has an edge
    async fn insert_dependency(&self, edge: DependencyEdge) -> Result<()>;

    /// Remove the edge `task_id -> depends_on_id` and return it.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyNotFound` if no such edge is recorded.
    async fn delete_dependency(
        &self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
    ) -> Result<DependencyEdge>;

    /// Flush pending changes to persistent storage.
    ///
    /// A no-op for stores without a backing file.
    async fn save(&self) -> Result<()>;

    /// Re-read persistent storage, replacing the in-memory snapshot.
    ///
    /// Other processes may write the same storage between calls. The engine
    /// refreshes under its write lock before every query and write. The
    /// default does nothing, for stores that always read through.
    async fn refresh(&self) -> Result<()> {
        Ok(())
    }
}
