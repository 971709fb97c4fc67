//! Impact analysis: who is held up if a task slips.

use crate::domain::{TaskId, TaskNode};
use crate::error::{Error, Result};
use crate::graph::TaskGraph;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use tracing::debug;

/// Coarse risk class derived from the number of affected tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// At most two affected tasks
    Low,
    /// Three to five affected tasks
    Medium,
    /// More than five affected tasks
    High,
}

impl RiskLevel {
    /// Classify a total impact count.
    #[must_use]
    pub fn from_total_impact(total: usize) -> Self {
        if total > 5 {
            Self::High
        } else if total > 2 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// Result of an impact query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Impact {
    /// The task being analysed
    pub task: TaskNode,

    /// Tasks that depend on it directly, ordered by id
    pub direct_dependents: Vec<TaskNode>,

    /// Tasks that depend on it through others, in breadth-first order
    pub indirect_dependents: Vec<TaskNode>,

    /// Size of the union of direct and indirect dependents
    pub total_impact: usize,

    /// Dependents that are neither `done` nor `archived`
    pub would_block_count: usize,

    /// Risk class of `total_impact`
    pub risk_level: RiskLevel,

    /// Hops to the farthest dependent (0 when there are none)
    pub max_depth: usize,
}

/// Compute the transitive dependents of `task_id`.
///
/// # Errors
///
/// Returns `Error::TaskNotFound` if the task is not in the graph.
pub fn analyze_impact(graph: &TaskGraph, task_id: &TaskId) -> Result<Impact> {
    let origin = graph
        .index_of(task_id)
        .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;

    let mut visited: HashSet<NodeIndex> = HashSet::from([origin]);
    let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
    let mut direct = Vec::new();
    let mut indirect = Vec::new();
    let mut max_depth = 0;

    for node in graph.sorted_neighbours(origin, Direction::Incoming) {
        visited.insert(node);
        direct.push(node);
        queue.push_back((node, 1));
    }

    while let Some((node, depth)) = queue.pop_front() {
        max_depth = max_depth.max(depth);
        for next in graph.sorted_neighbours(node, Direction::Incoming) {
            if visited.insert(next) {
                indirect.push(next);
                queue.push_back((next, depth + 1));
            }
        }
    }

    let total_impact = direct.len() + indirect.len();
    let would_block_count = direct
        .iter()
        .chain(&indirect)
        .filter(|&&node| !graph.node(node).status.is_terminal())
        .count();
    let risk_level = RiskLevel::from_total_impact(total_impact);

    debug!(
        task = %task_id,
        direct = direct.len(),
        indirect = indirect.len(),
        would_block_count,
        %risk_level,
        "Computed impact"
    );

    let tasks = |nodes: Vec<NodeIndex>| -> Vec<TaskNode> {
        nodes.into_iter().map(|n| graph.node(n).clone()).collect()
    };
    Ok(Impact {
        task: graph.node(origin).clone(),
        direct_dependents: tasks(direct),
        indirect_dependents: tasks(indirect),
        total_impact,
        would_block_count,
        risk_level,
        max_depth,
    })
}
