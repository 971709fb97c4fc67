//! Critical path: the longest weighted chain of open work.
//!
//! The finder drops `done` tasks, orders the rest with Kahn's algorithm and
//! runs a longest-path DP over the topological order. Ties are broken
//! deterministically, first by node count and then by the id sequence.

use crate::domain::{TaskId, TaskNode, TaskStatus};
use crate::error::{Error, Result};
use crate::graph::TaskGraph;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, error};

/// A task that holds up more than one other task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    /// The blocking task
    pub task: TaskNode,

    /// Number of open tasks directly depending on it
    pub dependent_count: usize,

    /// `dependent_count * priority`, the ranking key
    pub score: u64,
}

/// Result of a critical path query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath {
    /// Tasks on the path, from a starting task to the end of the chain
    pub tasks: Vec<TaskNode>,

    /// Sum of task weights along the path, in hours
    pub total_duration: f64,

    /// Number of `blocks` edges examined
    pub dependency_count: usize,

    /// Open tasks with no open dependencies, ordered by id
    pub starting_tasks: Vec<TaskNode>,

    /// Ranked bottleneck tasks
    pub bottlenecks: Vec<Bottleneck>,
}

impl CriticalPath {
    /// Whether the path has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Whether `id` lies on the path.
    #[must_use]
    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|task| &task.id == id)
    }
}

/// Compute the critical path of `graph`, ignoring `done` tasks.
///
/// With no `blocks` edges left the path is empty, the duration is zero and
/// every open task is a starting task.
///
/// # Errors
///
/// Returns `Error::GraphCorrupted` if the `blocks` edges contain a cycle.
pub fn find_critical_path(graph: &TaskGraph) -> Result<CriticalPath> {
    let open = graph.retain_tasks(|task| task.status != TaskStatus::Done);
    let dependency_count = open.blocking_edge_count();

    let starting_tasks = starting_tasks(&open);
    let bottlenecks = bottlenecks(&open);

    let empty = |starting_tasks: Vec<TaskNode>, bottlenecks: Vec<Bottleneck>| CriticalPath {
        tasks: Vec::new(),
        total_duration: 0.0,
        dependency_count,
        starting_tasks,
        bottlenecks,
    };

    if dependency_count == 0 {
        debug!(tasks = open.len(), "No blocking dependencies, critical path is empty");
        return Ok(empty(starting_tasks, bottlenecks));
    }

    let order = topological_order(&open)?;
    let table = LongestPaths::compute(&open, &order);

    let Some(end) = order
        .iter()
        .copied()
        .reduce(|best, node| if table.better(&open, node, best) { node } else { best })
    else {
        return Ok(empty(starting_tasks, bottlenecks));
    };

    let tasks: Vec<TaskNode> = table
        .chain(end)
        .into_iter()
        .map(|node| open.node(node).clone())
        .collect();
    let total_duration = table.best[end.index()];

    debug!(
        length = tasks.len(),
        total_duration,
        dependency_count,
        bottlenecks = bottlenecks.len(),
        "Computed critical path"
    );

    Ok(CriticalPath {
        tasks,
        total_duration,
        dependency_count,
        starting_tasks,
        bottlenecks,
    })
}

fn starting_tasks(graph: &TaskGraph) -> Vec<TaskNode> {
    let mut tasks: Vec<TaskNode> = graph
        .node_indices()
        .filter(|&node| graph.sorted_neighbours(node, Direction::Outgoing).is_empty())
        .map(|node| graph.node(node).clone())
        .collect();
    tasks.sort_by(|a, b| a.id.cmp(&b.id));
    tasks
}

fn bottlenecks(graph: &TaskGraph) -> Vec<Bottleneck> {
    let mut ranked: Vec<Bottleneck> = graph
        .node_indices()
        .filter(|&node| !graph.node(node).status.is_terminal())
        .filter_map(|node| {
            let dependent_count = graph.sorted_neighbours(node, Direction::Incoming).len();
            (dependent_count > 1).then(|| {
                let task = graph.node(node).clone();
                let score = u64::try_from(dependent_count)
                    .unwrap_or(u64::MAX)
                    .saturating_mul(u64::from(task.priority));
                Bottleneck {
                    task,
                    dependent_count,
                    score,
                }
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.dependent_count.cmp(&a.dependent_count))
            .then_with(|| a.task.id.cmp(&b.task.id))
    });
    ranked
}

/// Kahn's algorithm over `blocks` edges, releasing ready nodes in id order.
///
/// A node's in-degree is its number of dependencies.
fn topological_order(graph: &TaskGraph) -> Result<Vec<NodeIndex>> {
    let mut remaining: BTreeMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|node| (node, graph.sorted_neighbours(node, Direction::Outgoing).len()))
        .collect();

    let mut ready: BTreeMap<&TaskId, NodeIndex> = remaining
        .iter()
        .filter(|&(_, &degree)| degree == 0)
        .map(|(&node, _)| (&graph.node(node).id, node))
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while let Some((_, node)) = ready.pop_first() {
        order.push(node);
        remaining.remove(&node);
        for dependent in graph.sorted_neighbours(node, Direction::Incoming) {
            if let Some(degree) = remaining.get_mut(&dependent) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(&graph.node(dependent).id, dependent);
                }
            }
        }
    }

    if order.len() < graph.len() {
        let mut unordered: Vec<_> = remaining
            .keys()
            .map(|&node| graph.node(node).id.clone())
            .collect();
        unordered.sort();
        error!(
            unordered = unordered.len(),
            first = ?unordered.first(),
            "Dependency graph contains a cycle"
        );
        return Err(Error::GraphCorrupted { unordered });
    }

    Ok(order)
}

/// Relative tolerance below which two path durations count as equal.
const DURATION_TOLERANCE: f64 = 1e-9;

/// Order two durations, treating sums that differ only by rounding as equal.
fn compare_hours(a: f64, b: f64) -> Ordering {
    let scale = a.abs().max(b.abs()).max(1.0);
    if (a - b).abs() <= DURATION_TOLERANCE * scale {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Longest-path table indexed by `NodeIndex::index()`.
struct LongestPaths {
    best: Vec<f64>,
    length: Vec<usize>,
    predecessor: Vec<Option<NodeIndex>>,
}

impl LongestPaths {
    fn compute(graph: &TaskGraph, order: &[NodeIndex]) -> Self {
        let size = graph.len();
        let mut table = Self {
            best: vec![0.0; size],
            length: vec![0; size],
            predecessor: vec![None; size],
        };

        for &node in order {
            let predecessor = graph
                .sorted_neighbours(node, Direction::Outgoing)
                .into_iter()
                .reduce(|best, candidate| {
                    if table.better(graph, candidate, best) {
                        candidate
                    } else {
                        best
                    }
                });

            let (base, length) = predecessor.map_or((0.0, 0), |p| {
                (table.best[p.index()], table.length[p.index()])
            });
            table.best[node.index()] = graph.node(node).weight() + base;
            table.length[node.index()] = length + 1;
            table.predecessor[node.index()] = predecessor;
        }

        table
    }

    /// Whether the chain ending at `a` beats the chain ending at `b`.
    fn better(&self, graph: &TaskGraph, a: NodeIndex, b: NodeIndex) -> bool {
        let ordering = compare_hours(self.best[a.index()], self.best[b.index()])
            .then_with(|| self.length[a.index()].cmp(&self.length[b.index()]))
            .then_with(|| {
                let ids = |node| {
                    self.chain(node)
                        .into_iter()
                        .map(|n| &graph.node(n).id)
                        .collect::<Vec<_>>()
                };
                // Smaller id sequence wins, so reverse the natural order.
                ids(b).cmp(&ids(a))
            });
        ordering == Ordering::Greater
    }

    /// Nodes from the chain's starting task up to `end`.
    fn chain(&self, end: NodeIndex) -> Vec<NodeIndex> {
        let mut chain = vec![end];
        let mut cursor = end;
        while let Some(prev) = self.predecessor[cursor.index()] {
            chain.push(prev);
            cursor = prev;
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyType;
    use rstest::rstest;

    fn ids(tasks: &[TaskNode]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    /// A(2h), B(3h), C(4h), D(1h); B -> A, C -> B, D -> B.
    fn diamond_graph() -> TaskGraph {
        TaskGraph::from_parts(
            [
                TaskNode::new("A", "Design").with_estimate(2.0),
                TaskNode::new("B", "Build").with_estimate(3.0),
                TaskNode::new("C", "Test").with_estimate(4.0),
                TaskNode::new("D", "Docs").with_estimate(1.0),
            ],
            [
                ("B", "A", DependencyType::Blocks),
                ("C", "B", DependencyType::Blocks),
                ("D", "B", DependencyType::Blocks),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_longest_chain() {
        let path = find_critical_path(&diamond_graph()).unwrap();

        assert_eq!(ids(&path.tasks), vec!["A", "B", "C"]);
        assert!((path.total_duration - 9.0).abs() < f64::EPSILON);
        assert_eq!(path.dependency_count, 3);
        assert_eq!(ids(&path.starting_tasks), vec!["A"]);
        assert_eq!(path.bottlenecks.len(), 1);
        assert_eq!(path.bottlenecks[0].task.id.as_str(), "B");
        assert_eq!(path.bottlenecks[0].dependent_count, 2);
    }

    #[test]
    fn test_no_edges_gives_empty_path() {
        let graph = TaskGraph::from_parts(
            [TaskNode::new("b", "B"), TaskNode::new("a", "A")],
            [],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();

        assert!(path.is_empty());
        assert!(path.total_duration.abs() < f64::EPSILON);
        assert_eq!(path.dependency_count, 0);
        assert_eq!(ids(&path.starting_tasks), vec!["a", "b"]);
        assert!(path.bottlenecks.is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let path = find_critical_path(&TaskGraph::new()).unwrap();
        assert!(path.is_empty());
        assert!(path.starting_tasks.is_empty());
    }

    #[test]
    fn test_done_tasks_are_excluded() {
        let source = diamond_graph();
        let graph = TaskGraph::from_parts(
            source.tasks().map(|t| {
                if t.id.as_str() == "A" {
                    t.clone().with_status(TaskStatus::Done)
                } else {
                    t.clone()
                }
            }),
            [
                ("B", "A", DependencyType::Blocks),
                ("C", "B", DependencyType::Blocks),
                ("D", "B", DependencyType::Blocks),
            ],
        )
        .unwrap();

        let path = find_critical_path(&graph).unwrap();
        assert_eq!(ids(&path.tasks), vec!["B", "C"]);
        assert!((path.total_duration - 7.0).abs() < f64::EPSILON);
        assert_eq!(path.dependency_count, 2);
        assert_eq!(ids(&path.starting_tasks), vec!["B"]);
    }

    #[test]
    fn test_missing_estimate_counts_one_hour() {
        let graph = TaskGraph::from_parts(
            [TaskNode::new("a", "A"), TaskNode::new("b", "B")],
            [("b", "a", DependencyType::Blocks)],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();
        assert!((path.total_duration - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tie_prefers_more_nodes() {
        // x(4h) alone vs. a(2h) -> b(2h); both end at z.
        let graph = TaskGraph::from_parts(
            [
                TaskNode::new("a", "A").with_estimate(2.0),
                TaskNode::new("b", "B").with_estimate(2.0),
                TaskNode::new("x", "X").with_estimate(4.0),
                TaskNode::new("z", "Z").with_estimate(1.0),
            ],
            [
                ("b", "a", DependencyType::Blocks),
                ("z", "b", DependencyType::Blocks),
                ("z", "x", DependencyType::Blocks),
            ],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();
        assert_eq!(ids(&path.tasks), vec!["a", "b", "z"]);
    }

    #[test]
    fn test_fractional_estimates_still_tie() {
        // 0.1h + 0.7h accumulates to 0.7999999999999999, against r's 0.8h.
        let graph = TaskGraph::from_parts(
            [
                TaskNode::new("p", "P").with_estimate(0.1),
                TaskNode::new("q", "Q").with_estimate(0.7),
                TaskNode::new("r", "R").with_estimate(0.8),
                TaskNode::new("z", "Z").with_estimate(1.0),
            ],
            [
                ("q", "p", DependencyType::Blocks),
                ("z", "q", DependencyType::Blocks),
                ("z", "r", DependencyType::Blocks),
            ],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();

        assert_eq!(ids(&path.tasks), vec!["p", "q", "z"]);
        assert!((path.total_duration - 1.8).abs() < 1e-9);
    }

    #[rstest]
    #[case::rounding(0.1 + 0.7, 0.8, Ordering::Equal)]
    #[case::exact(2.0, 2.0, Ordering::Equal)]
    #[case::shorter(1.7, 1.8, Ordering::Less)]
    #[case::longer(5.0, 4.5, Ordering::Greater)]
    #[case::large_values(1e6 + 0.3, 1e6 + 0.1 + 0.2, Ordering::Equal)]
    fn test_compare_hours(#[case] a: f64, #[case] b: f64, #[case] expected: Ordering) {
        assert_eq!(compare_hours(a, b), expected);
    }

    #[test]
    fn test_tie_prefers_smallest_id_sequence() {
        // Two equal chains: m -> n and c -> d, each 2 nodes of 1h.
        let graph = TaskGraph::from_parts(
            ["c", "d", "m", "n"].map(|id| TaskNode::new(id, id)),
            [
                ("n", "m", DependencyType::Blocks),
                ("d", "c", DependencyType::Blocks),
            ],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();
        assert_eq!(ids(&path.tasks), vec!["c", "d"]);
    }

    #[test]
    fn test_bottleneck_ranking_uses_priority() {
        // hub-a has 2 dependents, hub-b has 3; hub-a has the higher priority.
        let graph = TaskGraph::from_parts(
            [
                TaskNode::new("hub-a", "A").with_priority(5),
                TaskNode::new("hub-b", "B").with_priority(1),
                TaskNode::new("t1", "1"),
                TaskNode::new("t2", "2"),
                TaskNode::new("t3", "3"),
            ],
            [
                ("t1", "hub-a", DependencyType::Blocks),
                ("t2", "hub-a", DependencyType::Blocks),
                ("t1", "hub-b", DependencyType::Blocks),
                ("t2", "hub-b", DependencyType::Blocks),
                ("t3", "hub-b", DependencyType::Blocks),
            ],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();

        let ranked: Vec<(&str, u64)> = path
            .bottlenecks
            .iter()
            .map(|b| (b.task.id.as_str(), b.score))
            .collect();
        assert_eq!(ranked, vec![("hub-a", 10), ("hub-b", 3)]);
    }

    #[test]
    fn test_archived_task_is_not_a_bottleneck() {
        let graph = TaskGraph::from_parts(
            [
                TaskNode::new("a", "A").with_status(TaskStatus::Archived),
                TaskNode::new("b", "B"),
                TaskNode::new("c", "C"),
            ],
            [
                ("b", "a", DependencyType::Blocks),
                ("c", "a", DependencyType::Blocks),
            ],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();
        assert!(path.bottlenecks.is_empty());
        assert!(path.contains(&TaskId::new("a")));
    }

    #[test]
    fn test_repeated_calls_agree() {
        let graph = diamond_graph();
        let first = find_critical_path(&graph).unwrap();
        for _ in 0..5 {
            assert_eq!(find_critical_path(&graph).unwrap(), first);
        }
    }
}
