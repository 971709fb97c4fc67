//! Text renderings of a dependency graph.
//!
//! Submodules:
//! - [`glyph`]: status icons and color helpers
//! - [`tree`]: indented tree following dependents or dependencies
//! - [`chain`]: the critical path as a connector chain
//! - [`dot`]: Graphviz DOT output
//!
//! Rendering is pure: every function takes a loaded graph plus options and
//! writes text. Callers decide where the text goes.

pub(crate) mod glyph;
pub mod chain;
pub mod dot;
pub mod tree;

use crate::analysis::find_critical_path;
use crate::domain::{BoardId, TaskId};
use crate::error::Result;
use crate::graph::TaskGraph;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

pub use chain::write_chain;
pub use dot::write_dot;
pub use tree::write_tree;

/// Output format of a visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    /// Indented tree
    #[default]
    Tree,
    /// Critical path as a connector chain
    Ascii,
    /// Graphviz DOT
    Dot,
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tree => "tree",
            Self::Ascii => "ascii",
            Self::Dot => "dot",
        };
        f.write_str(s)
    }
}

/// Which way the tree grows from its roots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeDirection {
    /// Children are the tasks waiting on the parent
    #[default]
    Dependents,
    /// Children are the tasks the parent waits on
    Dependencies,
}

/// Options for [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Output format
    pub format: RenderFormat,

    /// Print id, status, estimate and due date for each task
    pub show_task_details: bool,

    /// Restrict the graph to one board (applied by the loader)
    pub board: Option<BoardId>,

    /// Start the tree at this task instead of every root
    pub root: Option<TaskId>,

    /// Tree growth direction
    pub direction: TreeDirection,

    /// ASCII-only glyphs and connectors
    pub use_ascii: bool,

    /// ANSI colors (never applied to DOT)
    pub use_colors: bool,

    /// Reference date for the overdue flag
    pub today: NaiveDate,
}

impl RenderOptions {
    /// Options for `format` with every other setting at its default.
    #[must_use]
    pub fn new(format: RenderFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: RenderFormat::default(),
            show_task_details: false,
            board: None,
            root: None,
            direction: TreeDirection::default(),
            use_ascii: false,
            use_colors: false,
            today: Local::now().date_naive(),
        }
    }
}

/// Render `graph` in the format selected by `options`.
///
/// The ASCII chain and DOT formats compute the critical path themselves.
///
/// # Errors
///
/// - `Error::TaskNotFound` if `options.root` is not in the graph
/// - `Error::GraphCorrupted` if the critical path cannot be computed
pub fn render(graph: &TaskGraph, options: &RenderOptions) -> Result<String> {
    let mut buf = Vec::new();
    match options.format {
        RenderFormat::Tree => write_tree(&mut buf, graph, options)?,
        RenderFormat::Ascii => {
            let path = find_critical_path(graph)?;
            write_chain(&mut buf, &path, options)?;
        }
        RenderFormat::Dot => {
            let path = find_critical_path(graph)?;
            write_dot(&mut buf, graph, Some(&path))?;
        }
    }
    Ok(String::from_utf8(buf).map_err(io::Error::other)?)
}

/// Format hours without a trailing `.0`.
pub(crate) fn format_hours(hours: f64) -> String {
    format!("{hours}h")
}

/// Write the detail suffix shared by the tree and chain renderers.
pub(crate) fn write_details<W: Write>(
    w: &mut W,
    task: &crate::domain::TaskNode,
    options: &RenderOptions,
) -> io::Result<()> {
    write!(w, " [{}", glyph::status_text(task.status, options))?;
    if let Some(hours) = task.estimated_hours {
        write!(w, ", {}", format_hours(hours))?;
    }
    if let Some(due) = task.due_date {
        write!(w, ", due {due}")?;
        if task.is_overdue(options.today) {
            write!(w, " {}", glyph::overdue("OVERDUE", options))?;
        }
    }
    write!(w, "]")
}
