//! In-memory task dependency graph.
//!
//! The graph is rebuilt for every analysis call from a snapshot of the task
//! store (see [`loader`]) and is never mutated by the analyses themselves.
//!
//! # Edge Direction Convention
//!
//! Edges follow a **dependent -> dependency** direction:
//!
//! - **Edge source**: the task that has the dependency (the dependent)
//! - **Edge target**: the task being depended upon (the dependency)
//! - **Edge weight**: the [`DependencyType`] of the relationship
//!
//! If task B is blocked by task A, the edge is `B -> A` with weight `Blocks`.
//! Outgoing edges of a node are therefore its `dependencies` and incoming
//! edges are its `dependents`.
//!
//! Only `Blocks` edges are visible through [`TaskGraph::dependencies`] and
//! [`TaskGraph::dependents`]. Informational edges are kept only when the
//! loader is asked for them, and only the renderer looks at them.

pub mod cycle;
pub mod loader;

use crate::domain::{DependencyType, TaskId, TaskNode};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

pub use cycle::{cycle_path, would_create_cycle};
pub use loader::{GraphLoader, LoadOptions};

/// Directed graph of tasks and their dependencies.
///
/// Nodes are allocated first and edges are wired up through the
/// `node_map` lookup, so ownership stays flat regardless of graph shape.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    /// Node weights are tasks, edge weights are dependency types.
    /// Edge direction: source (dependent) -> target (dependency).
    graph: DiGraph<TaskNode, DependencyType>,

    /// Mapping from `TaskId` to graph `NodeIndex`.
    node_map: HashMap<TaskId, NodeIndex>,

    /// Nodes pulled in from outside the requested board.
    placeholders: HashSet<NodeIndex>,
}

impl TaskGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from tasks and `(dependent, dependency, type)` triples.
    ///
    /// # Errors
    ///
    /// Returns `Error::DanglingReference` if an edge names an unknown task.
    pub fn from_parts<'a, T, E>(tasks: T, edges: E) -> Result<Self>
    where
        T: IntoIterator<Item = TaskNode>,
        E: IntoIterator<Item = (&'a str, &'a str, DependencyType)>,
    {
        let mut graph = Self::new();
        for task in tasks {
            graph.add_task(task);
        }
        for (from, to, dep_type) in edges {
            graph.add_dependency(&TaskId::from(from), &TaskId::from(to), dep_type)?;
        }
        Ok(graph)
    }

    /// Add a task node.
    ///
    /// Returns `false` and leaves the graph untouched if a task with the same
    /// ID is already present.
    pub fn add_task(&mut self, task: TaskNode) -> bool {
        if self.node_map.contains_key(&task.id) {
            return false;
        }
        let id = task.id.clone();
        let node = self.graph.add_node(task);
        self.node_map.insert(id, node);
        true
    }

    /// Add a task that lives outside the requested board.
    pub(crate) fn add_placeholder(&mut self, task: TaskNode) -> bool {
        let id = task.id.clone();
        if !self.add_task(task) {
            return false;
        }
        self.placeholders.insert(self.node_map[&id]);
        true
    }

    /// Record that `task_id` depends on `depends_on_id`.
    ///
    /// A pair holds at most one edge. A `Blocks` edge wins over an
    /// informational one for the same pair.
    ///
    /// # Errors
    ///
    /// - `Error::SelfDependency` if both ends are the same task
    /// - `Error::DanglingReference` if either endpoint is not a node
    pub fn add_dependency(
        &mut self,
        task_id: &TaskId,
        depends_on_id: &TaskId,
        dep_type: DependencyType,
    ) -> Result<()> {
        if task_id == depends_on_id {
            return Err(Error::SelfDependency(task_id.clone()));
        }
        let from = self.require_endpoint(task_id, task_id)?;
        let to = self.require_endpoint(task_id, depends_on_id)?;

        match self.graph.find_edge(from, to) {
            Some(edge) => {
                if dep_type.is_scheduling() {
                    self.graph[edge] = dep_type;
                }
            }
            None => {
                self.graph.add_edge(from, to, dep_type);
            }
        }
        Ok(())
    }

    fn require_endpoint(&self, owner: &TaskId, id: &TaskId) -> Result<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::DanglingReference {
                task: owner.clone(),
                missing: id.clone(),
            })
    }

    /// Number of tasks in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether the task is part of the graph.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Look up a task by ID.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&TaskNode> {
        self.node_map.get(id).map(|&node| &self.graph[node])
    }

    /// Whether the task was pulled in from outside the requested board.
    #[must_use]
    pub fn is_placeholder(&self, id: &TaskId) -> bool {
        self.node_map
            .get(id)
            .is_some_and(|node| self.placeholders.contains(node))
    }

    /// All tasks in load order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskNode> {
        self.graph.node_indices().map(|node| &self.graph[node])
    }

    /// Tasks that `id` depends on through `Blocks` edges, ordered by ID.
    #[must_use]
    pub fn dependencies(&self, id: &TaskId) -> Vec<&TaskNode> {
        self.neighbours(id, Direction::Outgoing)
    }

    /// Tasks that depend on `id` through `Blocks` edges, ordered by ID.
    #[must_use]
    pub fn dependents(&self, id: &TaskId) -> Vec<&TaskNode> {
        self.neighbours(id, Direction::Incoming)
    }

    fn neighbours(&self, id: &TaskId, direction: Direction) -> Vec<&TaskNode> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };
        self.sorted_neighbours(node, direction)
            .into_iter()
            .map(|n| &self.graph[n])
            .collect()
    }

    /// Number of `Blocks` edges.
    #[must_use]
    pub fn blocking_edge_count(&self) -> usize {
        self.graph
            .edge_references()
            .filter(|edge| edge.weight().is_scheduling())
            .count()
    }

    /// Every edge as `(dependent, dependency, type)`, informational ones included.
    pub fn edges(&self) -> impl Iterator<Item = (&TaskNode, &TaskNode, DependencyType)> {
        self.graph.edge_references().map(|edge| {
            (
                &self.graph[edge.source()],
                &self.graph[edge.target()],
                *edge.weight(),
            )
        })
    }

    /// Copy of the graph restricted to tasks matching `keep`.
    ///
    /// Edges survive only when both endpoints are kept.
    #[must_use]
    pub fn retain_tasks<F>(&self, keep: F) -> Self
    where
        F: Fn(&TaskNode) -> bool,
    {
        let mut filtered = Self::new();
        for node in self.graph.node_indices() {
            let task = &self.graph[node];
            if !keep(task) {
                continue;
            }
            if self.placeholders.contains(&node) {
                filtered.add_placeholder(task.clone());
            } else {
                filtered.add_task(task.clone());
            }
        }
        for edge in self.graph.edge_references() {
            let (Some(&from), Some(&to)) = (
                filtered.node_map.get(&self.graph[edge.source()].id),
                filtered.node_map.get(&self.graph[edge.target()].id),
            ) else {
                continue;
            };
            filtered.graph.add_edge(from, to, *edge.weight());
        }
        filtered
    }

    // ========== Index-level access for the analyses ==========

    pub(crate) fn index_of(&self, id: &TaskId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub(crate) fn node(&self, node: NodeIndex) -> &TaskNode {
        &self.graph[node]
    }

    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub(crate) fn is_placeholder_index(&self, node: NodeIndex) -> bool {
        self.placeholders.contains(&node)
    }

    /// `Blocks` neighbours of a node in the given direction, ordered by task ID.
    pub(crate) fn sorted_neighbours(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbours: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, direction)
            .filter(|edge| edge.weight().is_scheduling())
            .map(|edge| match direction {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            })
            .collect();
        neighbours.sort_by(|a, b| self.graph[*a].id.cmp(&self.graph[*b].id));
        neighbours.dedup();
        neighbours
    }
}
