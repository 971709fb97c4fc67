//! MCP server for the tasklane dependency engine.
//!
//! This crate exposes critical-path analysis, impact analysis, graph
//! rendering and dependency editing to AI assistants over the Model
//! Context Protocol.
//!
//! # Architecture
//!
//! The server uses the `rmcp` crate for protocol handling and wraps one
//! [`tasklane::Engine`] per workspace.
//!
//! # Tools
//!
//! ## Context Management
//! - `set_context` - Set the workspace root for all operations
//! - `where_am_i` - Show current workspace context
//!
//! ## Analysis
//! - `critical_path` - Longest chain of open work, ready tasks, bottlenecks
//! - `impact` - Everything a task transitively holds up
//! - `visualize` - Render the graph as a tree, ASCII or DOT
//!
//! ## Dependency Editing
//! - `add_dependency` - Record a dependency, rejecting cycles
//! - `remove_dependency` - Delete a dependency

pub mod context;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use error::{Error, Result};
pub use server::TasklaneMcpServer;
