//! Tasklane - task dependency graph and critical-path engine.
//!
//! Tasks live in an external store; this crate models their `blocks`,
//! `relates_to` and `duplicates` relationships as a directed graph, keeps
//! the `blocks` subgraph acyclic, and answers three questions about it:
//! what is the longest chain of open work, what does a task hold up, and
//! what does the graph look like.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tasklane::domain::{DependencyType, NewDependency, TaskNode};
//! use tasklane::engine::Engine;
//! use tasklane::store::InMemoryTaskStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = InMemoryTaskStore::from_snapshot(
//!         vec![
//!             TaskNode::new("design", "Design").with_estimate(2.0),
//!             TaskNode::new("build", "Build").with_estimate(3.0),
//!         ],
//!         vec![],
//!     );
//!     let engine = Engine::new(Arc::new(store));
//!
//!     engine
//!         .add_dependency(NewDependency::new("build", "design", DependencyType::Blocks))
//!         .await?;
//!
//!     let path = engine.critical_path(None).await?;
//!     assert_eq!(path.total_duration, 5.0);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod analysis;
pub mod domain;
pub mod engine;
pub mod error;
pub mod graph;
pub mod render;
pub mod store;

// CLI support
pub mod app;
pub mod cli;
pub mod config;
pub mod output;

pub use engine::Engine;
pub use error::{Error, Result};
