//! Graphviz DOT output.
//!
//! Edges point from the dependency to the dependent, so `dot -Tsvg` lays
//! the work out left to right in execution order.

use crate::analysis::CriticalPath;
use crate::domain::{TaskId, TaskStatus};
use crate::graph::TaskGraph;
use std::collections::HashSet;
use std::io::{self, Write};

const CRITICAL_STYLE: &str = "color=red, penwidth=2";

/// Write `graph` as a DOT digraph, highlighting `critical` when given.
pub fn write_dot<W: Write>(
    w: &mut W,
    graph: &TaskGraph,
    critical: Option<&CriticalPath>,
) -> io::Result<()> {
    let on_path: HashSet<&TaskId> = critical
        .map(|path| path.tasks.iter().map(|t| &t.id).collect())
        .unwrap_or_default();
    let critical_edges: HashSet<(&TaskId, &TaskId)> = critical
        .map(|path| {
            path.tasks
                .windows(2)
                .map(|pair| (&pair[0].id, &pair[1].id))
                .collect()
        })
        .unwrap_or_default();

    writeln!(w, "digraph tasks {{")?;
    writeln!(w, "  rankdir=LR;")?;
    writeln!(w, "  node [shape=box, style=filled];")?;
    writeln!(w)?;

    let mut tasks: Vec<_> = graph.tasks().collect();
    tasks.sort_by(|a, b| a.id.cmp(&b.id));
    for task in tasks {
        let mut attrs = format!(
            "label=\"{}\\n{}\", fillcolor={}",
            escape(task.id.as_str()),
            escape(&task.title),
            fill_color(task.status)
        );
        if graph.is_placeholder(&task.id) {
            attrs.push_str(", style=\"filled,dashed\"");
        }
        if on_path.contains(&task.id) {
            attrs.push_str(", ");
            attrs.push_str(CRITICAL_STYLE);
        }
        writeln!(w, "  \"{}\" [{attrs}];", escape(task.id.as_str()))?;
    }

    writeln!(w)?;

    let mut edges: Vec<_> = graph
        .edges()
        .map(|(dependent, dependency, dep_type)| (&dependency.id, &dependent.id, dep_type))
        .collect();
    edges.sort();
    for (from, to, dep_type) in edges {
        let mut attrs = Vec::new();
        if !dep_type.is_scheduling() {
            attrs.push(format!("style=dashed, label=\"{dep_type}\""));
        } else if critical_edges.contains(&(from, to)) {
            attrs.push(CRITICAL_STYLE.to_string());
        }
        let attrs = if attrs.is_empty() {
            String::new()
        } else {
            format!(" [{}]", attrs.join(", "))
        };
        writeln!(
            w,
            "  \"{}\" -> \"{}\"{attrs};",
            escape(from.as_str()),
            escape(to.as_str())
        )?;
    }

    writeln!(w, "}}")
}

fn fill_color(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "white",
        TaskStatus::InProgress => "lightyellow",
        TaskStatus::Done => "lightgreen",
        TaskStatus::Blocked => "lightcoral",
        TaskStatus::Archived => "lightgray",
    }
}

/// Escape a string for use inside a double-quoted DOT ID.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::find_critical_path;
    use crate::domain::{DependencyType, TaskNode};

    fn render(graph: &TaskGraph, critical: Option<&CriticalPath>) -> String {
        let mut buf = Vec::new();
        write_dot(&mut buf, graph, critical).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_nodes_and_edges() {
        let graph = TaskGraph::from_parts(
            [
                TaskNode::new("b", "Build").with_status(TaskStatus::Done),
                TaskNode::new("a", "Design"),
            ],
            [("b", "a", DependencyType::Blocks)],
        )
        .unwrap();
        let output = render(&graph, None);
        let expected = "\
digraph tasks {
  rankdir=LR;
  node [shape=box, style=filled];

  \"a\" [label=\"a\\nDesign\", fillcolor=white];
  \"b\" [label=\"b\\nBuild\", fillcolor=lightgreen];

  \"a\" -> \"b\";
}
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_critical_path_is_highlighted() {
        let graph = TaskGraph::from_parts(
            [
                TaskNode::new("a", "A").with_estimate(5.0),
                TaskNode::new("b", "B"),
                TaskNode::new("c", "C"),
            ],
            [
                ("b", "a", DependencyType::Blocks),
                ("c", "a", DependencyType::RelatesTo),
            ],
        )
        .unwrap();
        let path = find_critical_path(&graph).unwrap();
        let output = render(&graph, Some(&path));

        assert!(output.contains("\"a\" [label=\"a\\nA\", fillcolor=white, color=red, penwidth=2];"));
        assert!(output.contains("\"c\" [label=\"c\\nC\", fillcolor=white];"));
        assert!(output.contains("\"a\" -> \"b\" [color=red, penwidth=2];"));
        assert!(output.contains("\"a\" -> \"c\" [style=dashed, label=\"relates_to\"];"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let graph =
            TaskGraph::from_parts([TaskNode::new("q", "Say \"hi\"\\now")], []).unwrap();
        let output = render(&graph, None);
        assert!(output.contains(r#"label="q\nSay \"hi\"\\now""#));
    }

    #[test]
    fn test_placeholder_is_dashed() {
        let mut graph = TaskGraph::new();
        graph.add_placeholder(TaskNode::new("x", "Remote"));
        let output = render(&graph, None);
        assert!(output.contains("style=\"filled,dashed\""));
    }
}
