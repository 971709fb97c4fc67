//! Indented tree rendering.
//!
//! ```text
//! ○ Design
//! └── ○ Build
//!     ├── ○ Test
//!     └── ○ Docs
//! ```
//!
//! A task reachable through several branches is expanded the first time
//! only; later occurrences carry a `(shown above)` marker.

use super::glyph::{dimmed, id, placeholder_marker, status_icon};
use super::{RenderOptions, TreeDirection, write_details};
use crate::error::{Error, Result};
use crate::graph::TaskGraph;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use std::io::Write;

/// Pending tree line.
struct Frame {
    node: NodeIndex,
    /// For each ancestor level below the root, whether siblings follow.
    segments: Vec<bool>,
    is_last: bool,
}

/// Write the tree for `graph`.
///
/// Roots are `options.root` when set, otherwise every task with nothing on
/// the opposite side of `options.direction`, ordered by id.
///
/// # Errors
///
/// Returns `Error::TaskNotFound` if `options.root` is not in the graph, or
/// an I/O error from the writer.
pub fn write_tree<W: Write>(w: &mut W, graph: &TaskGraph, options: &RenderOptions) -> Result<()> {
    let (children_dir, parents_dir) = match options.direction {
        TreeDirection::Dependents => (Direction::Incoming, Direction::Outgoing),
        TreeDirection::Dependencies => (Direction::Outgoing, Direction::Incoming),
    };

    let roots: Vec<NodeIndex> = match &options.root {
        Some(root) => vec![
            graph
                .index_of(root)
                .ok_or_else(|| Error::TaskNotFound(root.clone()))?,
        ],
        None => {
            let mut roots: Vec<NodeIndex> = graph
                .node_indices()
                .filter(|&node| graph.sorted_neighbours(node, parents_dir).is_empty())
                .collect();
            roots.sort_by(|a, b| graph.node(*a).id.cmp(&graph.node(*b).id));
            roots
        }
    };

    if roots.is_empty() {
        writeln!(w, "{}", dimmed("No tasks", options))?;
        return Ok(());
    }

    let (branch, corner, pipe, space) = if options.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    let mut expanded: HashSet<NodeIndex> = HashSet::new();
    let mut stack: Vec<Frame> = Vec::new();

    for root in roots {
        write_label(w, graph, root, false, options)?;
        writeln!(w)?;
        if !expanded.insert(root) {
            continue;
        }
        push_children(&mut stack, graph, root, children_dir, Vec::new());

        while let Some(frame) = stack.pop() {
            let mut prefix = String::new();
            for &has_more in &frame.segments {
                prefix.push_str(&dimmed(if has_more { pipe } else { space }, options));
            }
            let connector = if frame.is_last { corner } else { branch };
            write!(w, "{prefix}{}", dimmed(connector, options))?;

            let repeated = !expanded.insert(frame.node);
            write_label(w, graph, frame.node, repeated, options)?;
            writeln!(w)?;
            if repeated {
                continue;
            }

            let mut segments = frame.segments;
            segments.push(!frame.is_last);
            push_children(&mut stack, graph, frame.node, children_dir, segments);
        }
    }

    Ok(())
}

/// Push children so that the smallest id is popped first.
fn push_children(
    stack: &mut Vec<Frame>,
    graph: &TaskGraph,
    node: NodeIndex,
    direction: Direction,
    segments: Vec<bool>,
) {
    let children = graph.sorted_neighbours(node, direction);
    let count = children.len();
    for (i, child) in children.into_iter().enumerate().rev() {
        stack.push(Frame {
            node: child,
            segments: segments.clone(),
            is_last: i + 1 == count,
        });
    }
}

fn write_label<W: Write>(
    w: &mut W,
    graph: &TaskGraph,
    node: NodeIndex,
    repeated: bool,
    options: &RenderOptions,
) -> Result<()> {
    let task = graph.node(node);
    write!(w, "{}", status_icon(task.status, options))?;
    if options.show_task_details {
        write!(w, " {}", id(task.id.as_str(), options))?;
    }
    write!(w, " {}", task.title)?;
    if options.show_task_details {
        write_details(w, task, options)?;
    }
    if graph.is_placeholder_index(node) {
        write!(w, " {}", placeholder_marker(options))?;
    }
    if repeated {
        write!(w, " {}", dimmed("(shown above)", options))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DependencyType, TaskId, TaskNode, TaskStatus};
    use chrono::NaiveDate;

    fn render(graph: &TaskGraph, options: &RenderOptions) -> String {
        let mut buf = Vec::new();
        write_tree(&mut buf, graph, options).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn scenario_graph() -> TaskGraph {
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
    fn test_tree_follows_dependents() {
        let output = render(&scenario_graph(), &RenderOptions::default());
        let expected = "\
○ Design
└── ○ Build
    ├── ○ Test
    └── ○ Docs
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_tree_upstream_from_root() {
        let options = RenderOptions {
            root: Some(TaskId::new("C")),
            direction: TreeDirection::Dependencies,
            use_ascii: true,
            ..RenderOptions::default()
        };
        let output = render(&scenario_graph(), &options);
        let expected = "\
o Test
`-- o Build
    `-- o Design
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_shared_dependent_is_shown_once() {
        let graph = TaskGraph::from_parts(
            ["a", "b", "c", "d"].map(|id| TaskNode::new(id, id)),
            [
                ("b", "a", DependencyType::Blocks),
                ("c", "a", DependencyType::Blocks),
                ("d", "b", DependencyType::Blocks),
                ("d", "c", DependencyType::Blocks),
            ],
        )
        .unwrap();
        let output = render(&graph, &RenderOptions::default());
        let expected = "\
○ a
├── ○ b
│   └── ○ d
└── ○ c
    └── ○ d (shown above)
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_details_and_overdue_flag() {
        let graph = TaskGraph::from_parts(
            [
                TaskNode::new("t-1", "Ship")
                    .with_status(TaskStatus::InProgress)
                    .with_estimate(2.5)
                    .with_due_date(NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()),
            ],
            [],
        )
        .unwrap();
        let options = RenderOptions {
            show_task_details: true,
            today: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            ..RenderOptions::default()
        };
        let output = render(&graph, &options);
        assert_eq!(
            output,
            "▶ t-1 Ship [in_progress, 2.5h, due 2026-10-01 OVERDUE]\n"
        );
    }

    #[test]
    fn test_placeholder_marker() {
        let mut graph = TaskGraph::new();
        graph.add_task(TaskNode::new("a", "Local"));
        graph.add_placeholder(TaskNode::new("x", "Remote"));
        graph
            .add_dependency(&TaskId::new("a"), &TaskId::new("x"), DependencyType::Blocks)
            .unwrap();

        let output = render(&graph, &RenderOptions::default());
        assert_eq!(output, "○ Remote (other board)\n└── ○ Local\n");
    }

    #[test]
    fn test_unknown_root() {
        let options = RenderOptions {
            root: Some(TaskId::new("nope")),
            ..RenderOptions::default()
        };
        let mut buf = Vec::new();
        let err = write_tree(&mut buf, &scenario_graph(), &options).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(_)));
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(render(&TaskGraph::new(), &RenderOptions::default()), "No tasks\n");
    }
}
