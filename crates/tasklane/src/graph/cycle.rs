//! Cycle guard for the dependency write path.
//!
//! Adding `from depends_on to` closes a loop exactly when `to` can already
//! reach `from` by following `dependencies` edges. The search is an
//! explicit queue with a visited set, so it is O(V + E) and independent of
//! chain depth.

use super::TaskGraph;
use crate::domain::{NewDependency, TaskId};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, VecDeque};

/// Check whether adding `from depends_on to` would create a cycle.
///
/// # Errors
///
/// - `Error::SelfDependency` if `from == to` (checked before anything else)
/// - `Error::TaskNotFound` if either task is not in the graph
pub fn would_create_cycle(graph: &TaskGraph, from: &TaskId, to: &TaskId) -> Result<bool> {
    Ok(cycle_path(graph, from, to)?.is_some())
}

/// Return the loop that `from depends_on to` would close, if any.
///
/// The loop starts and ends at `from`: `[from, to, ..., from]`.
///
/// # Errors
///
/// - `Error::SelfDependency` if `from == to`
/// - `Error::TaskNotFound` if either task is not in the graph
pub fn cycle_path(graph: &TaskGraph, from: &TaskId, to: &TaskId) -> Result<Option<Vec<TaskId>>> {
    if from == to {
        return Err(Error::SelfDependency(from.clone()));
    }
    let from_node = graph
        .index_of(from)
        .ok_or_else(|| Error::TaskNotFound(from.clone()))?;
    let to_node = graph
        .index_of(to)
        .ok_or_else(|| Error::TaskNotFound(to.clone()))?;

    let Some(chain) = reachable_path(graph, to_node, from_node) else {
        return Ok(None);
    };

    let mut path = Vec::with_capacity(chain.len() + 1);
    path.push(from.clone());
    path.extend(chain.into_iter().map(|node| graph.node(node).id.clone()));
    Ok(Some(path))
}

/// Validate a dependency request against the current graph.
///
/// Self dependencies are always rejected. Only `Blocks` requests are
/// checked for cycles; informational links cannot break the DAG invariant.
///
/// # Errors
///
/// Returns `SelfDependency`, `TaskNotFound` or `CycleDetected`.
pub fn check_dependency(graph: &TaskGraph, request: &NewDependency) -> Result<()> {
    let NewDependency {
        task_id,
        depends_on_id,
        dep_type,
    } = request;

    if task_id == depends_on_id {
        return Err(Error::SelfDependency(task_id.clone()));
    }
    for id in [task_id, depends_on_id] {
        if !graph.contains(id) {
            return Err(Error::TaskNotFound(id.clone()));
        }
    }
    if !dep_type.is_scheduling() {
        return Ok(());
    }

    match cycle_path(graph, task_id, depends_on_id)? {
        Some(path) => Err(Error::CycleDetected {
            from: task_id.clone(),
            to: depends_on_id.clone(),
            path,
        }),
        None => Ok(()),
    }
}

/// Breadth-first search along `dependencies` from `start` looking for `goal`.
///
/// Returns the node sequence `start ..= goal` when reachable.
fn reachable_path(graph: &TaskGraph, start: NodeIndex, goal: NodeIndex) -> Option<Vec<NodeIndex>> {
    let mut came_from: HashMap<NodeIndex, Option<NodeIndex>> = HashMap::new();
    let mut queue = VecDeque::new();
    came_from.insert(start, None);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            let mut path = vec![current];
            let mut cursor = current;
            while let Some(Some(prev)) = came_from.get(&cursor) {
                path.push(*prev);
                cursor = *prev;
            }
            path.reverse();
            return Some(path);
        }

        for next in graph.sorted_neighbours(current, Direction::Outgoing) {
            if !came_from.contains_key(&next) {
                came_from.insert(next, Some(current));
                queue.push_back(next);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyType, TaskNode};
    use rstest::rstest;

    /// B depends on A; C and D depend on B.
    fn chain_graph() -> TaskGraph {
        TaskGraph::from_parts(
            ["a", "b", "c", "d"].map(|id| TaskNode::new(id, id.to_uppercase())),
            [
                ("b", "a", DependencyType::Blocks),
                ("c", "b", DependencyType::Blocks),
                ("d", "b", DependencyType::Blocks),
            ],
        )
        .unwrap()
    }

    fn id(s: &str) -> TaskId {
        TaskId::new(s)
    }

    #[rstest]
    #[case::closes_loop("a", "c", true)]
    #[case::closes_short_loop("a", "b", true)]
    #[case::parallel_branch("c", "d", false)]
    #[case::already_implied("c", "a", false)]
    #[case::reverse_of_sibling("d", "c", false)]
    fn test_would_create_cycle(#[case] from: &str, #[case] to: &str, #[case] expected: bool) {
        let graph = chain_graph();
        assert_eq!(
            would_create_cycle(&graph, &id(from), &id(to)).unwrap(),
            expected
        );
    }

    #[test]
    fn test_cycle_path_reports_loop() {
        let graph = chain_graph();
        let path = cycle_path(&graph, &id("a"), &id("c")).unwrap().unwrap();
        assert_eq!(path, vec![id("a"), id("c"), id("b"), id("a")]);
    }

    #[test]
    fn test_self_dependency_rejected_even_for_unknown_task() {
        let graph = TaskGraph::new();
        let err = would_create_cycle(&graph, &id("x"), &id("x")).unwrap_err();
        assert!(matches!(err, Error::SelfDependency(ref t) if t.as_str() == "x"));
    }

    #[test]
    fn test_unknown_task_is_not_found() {
        let graph = chain_graph();
        let err = would_create_cycle(&graph, &id("a"), &id("zzz")).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(ref t) if t.as_str() == "zzz"));
    }

    #[test]
    fn test_check_dependency_allows_informational_back_edge() {
        let graph = chain_graph();
        let request = NewDependency::new("a", "c", DependencyType::RelatesTo);
        assert!(check_dependency(&graph, &request).is_ok());
    }

    #[test]
    fn test_check_dependency_rejects_blocking_back_edge() {
        let graph = chain_graph();
        let request = NewDependency::new("a", "c", DependencyType::Blocks);
        let err = check_dependency(&graph, &request).unwrap_err();
        assert!(matches!(err, Error::CycleDetected { ref path, .. } if path.len() == 4));
    }

    #[rstest]
    #[case::blocks(DependencyType::Blocks)]
    #[case::relates_to(DependencyType::RelatesTo)]
    #[case::duplicates(DependencyType::Duplicates)]
    fn test_check_dependency_rejects_self_link(#[case] dep_type: DependencyType) {
        let graph = chain_graph();
        let request = NewDependency::new("b", "b", dep_type);
        assert!(matches!(
            check_dependency(&graph, &request),
            Err(Error::SelfDependency(_))
        ));
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let n = 10_000;
        let tasks = (0..n).map(|i| TaskNode::new(format!("t{i:05}"), "step"));
        let names: Vec<String> = (0..n).map(|i| format!("t{i:05}")).collect();
        let edges: Vec<(&str, &str, DependencyType)> = names
            .windows(2)
            .map(|w| (w[1].as_str(), w[0].as_str(), DependencyType::Blocks))
            .collect();
        let graph = TaskGraph::from_parts(tasks, edges).unwrap();

        let first = id(&names[0]);
        let last = id(&names[n - 1]);
        assert!(would_create_cycle(&graph, &first, &last).unwrap());
        assert!(!would_create_cycle(&graph, &last, &first).unwrap());
    }
}
