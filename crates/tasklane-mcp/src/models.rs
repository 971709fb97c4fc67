//! MCP request and response models.
//!
//! Request parameters derive `JsonSchema` so rmcp can publish tool schemas.
//! Responses are flattened views of the engine's types with dates and
//! enums rendered as strings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tasklane::analysis::{Bottleneck, CriticalPath, Impact};
use tasklane::domain::{DependencyEdge, DependencyType, TaskNode};
use tasklane::render::RenderFormat;

// ============================================================================
// Request parameters
// ============================================================================

/// Parameters for the `set_context` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetContextParams {
    /// Absolute path to the workspace root (the directory containing `.tasklane/`).
    pub workspace_root: String,
}

/// Parameters for the `critical_path` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CriticalPathParams {
    /// Restrict the analysis to one board.
    pub board: Option<String>,
    /// Workspace to use instead of the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for the `impact` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ImpactParams {
    /// Task whose dependents should be analyzed.
    pub task_id: String,
    /// Workspace to use instead of the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for the `visualize` tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct VisualizeParams {
    /// Output format: tree, ascii or dot. Defaults to the workspace setting.
    pub format: Option<String>,
    /// Restrict the graph to one board.
    pub board: Option<String>,
    /// Render only the tree below this task.
    pub root: Option<String>,
    /// Walk towards dependencies instead of dependents.
    pub upstream: Option<bool>,
    /// Show status, estimate and due date next to each task.
    pub show_details: Option<bool>,
    /// Workspace to use instead of the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for the `add_dependency` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddDependencyParams {
    /// The dependent task.
    pub task_id: String,
    /// The task it depends on.
    pub depends_on_id: String,
    /// blocks (default), relates_to or duplicates.
    pub dep_type: Option<String>,
    /// Workspace to use instead of the current context.
    pub workspace_root: Option<String>,
}

/// Parameters for the `remove_dependency` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RemoveDependencyParams {
    /// The dependent task.
    pub task_id: String,
    /// The task it depends on.
    pub depends_on_id: String,
    /// Workspace to use instead of the current context.
    pub workspace_root: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Response from the `set_context` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SetContextResponse {
    /// The workspace root that was set.
    pub workspace_root: String,

    /// The path to the data file.
    pub data_path: String,

    /// Problems found while reading the data file.
    pub warnings: Vec<String>,

    /// Status message.
    pub message: String,
}

/// Response from the `where_am_i` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WhereAmIResponse {
    /// The current workspace root, if set.
    pub workspace_root: Option<String>,

    /// The current data file path, if set.
    pub data_path: Option<String>,

    /// Whether a context is currently set.
    pub context_set: bool,
}

/// Task representation for MCP responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct McpTask {
    /// Unique identifier.
    pub id: String,

    /// Task title.
    pub title: String,

    /// Current status.
    pub status: String,

    /// Priority (higher is more urgent).
    pub priority: u8,

    /// Estimated hours, if recorded.
    pub estimated_hours: Option<f64>,

    /// Hours used for path weighting.
    pub weight: f64,

    /// Due date (YYYY-MM-DD), if any.
    pub due_date: Option<String>,

    /// Board, if any.
    pub board_id: Option<String>,
}

impl From<TaskNode> for McpTask {
    fn from(task: TaskNode) -> Self {
        let weight = task.weight();
        Self {
            id: task.id.to_string(),
            title: task.title,
            status: task.status.to_string(),
            priority: task.priority,
            estimated_hours: task.estimated_hours,
            weight,
            due_date: task.due_date.map(|d| d.to_string()),
            board_id: task.board_id.map(|b| b.to_string()),
        }
    }
}

/// Bottleneck entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpBottleneck {
    /// The blocking task.
    pub task: McpTask,

    /// Number of open tasks directly depending on it.
    pub dependent_count: usize,

    /// Ranking score (dependents times priority).
    pub score: u64,
}

impl From<Bottleneck> for McpBottleneck {
    fn from(bottleneck: Bottleneck) -> Self {
        Self {
            task: bottleneck.task.into(),
            dependent_count: bottleneck.dependent_count,
            score: bottleneck.score,
        }
    }
}

/// Response from the `critical_path` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CriticalPathResponse {
    /// Tasks on the path, in execution order.
    pub tasks: Vec<McpTask>,

    /// Total hours along the path.
    pub total_duration: f64,

    /// Number of blocking dependencies examined.
    pub dependency_count: usize,

    /// Tasks that can start now.
    pub starting_tasks: Vec<McpTask>,

    /// Ranked bottlenecks.
    pub bottlenecks: Vec<McpBottleneck>,
}

impl From<CriticalPath> for CriticalPathResponse {
    fn from(path: CriticalPath) -> Self {
        Self {
            tasks: path.tasks.into_iter().map(Into::into).collect(),
            total_duration: path.total_duration,
            dependency_count: path.dependency_count,
            starting_tasks: path.starting_tasks.into_iter().map(Into::into).collect(),
            bottlenecks: path.bottlenecks.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response from the `impact` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImpactResponse {
    /// The analyzed task.
    pub task: McpTask,

    /// Tasks that depend on it directly.
    pub direct_dependents: Vec<McpTask>,

    /// Tasks that depend on it through other tasks.
    pub indirect_dependents: Vec<McpTask>,

    /// Direct plus indirect dependents.
    pub total_impact: usize,

    /// Dependents that are not done or archived.
    pub would_block_count: usize,

    /// LOW, MEDIUM or HIGH.
    pub risk_level: String,

    /// Longest hop count from the task to a dependent.
    pub max_depth: usize,
}

impl From<Impact> for ImpactResponse {
    fn from(impact: Impact) -> Self {
        Self {
            task: impact.task.into(),
            direct_dependents: impact.direct_dependents.into_iter().map(Into::into).collect(),
            indirect_dependents: impact
                .indirect_dependents
                .into_iter()
                .map(Into::into)
                .collect(),
            total_impact: impact.total_impact,
            would_block_count: impact.would_block_count,
            risk_level: impact.risk_level.to_string(),
            max_depth: impact.max_depth,
        }
    }
}

/// Response from the `visualize` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VisualizeResponse {
    /// Format that was rendered.
    pub format: String,

    /// Board filter, if any.
    pub board: Option<String>,

    /// Rendered graph.
    pub output: String,
}

/// A recorded dependency.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpDependency {
    /// The dependent task.
    pub task_id: String,

    /// The task it depends on.
    pub depends_on_id: String,

    /// Type of dependency.
    pub dep_type: String,

    /// When it was recorded (RFC 3339).
    pub created_at: String,
}

impl From<DependencyEdge> for McpDependency {
    fn from(edge: DependencyEdge) -> Self {
        Self {
            task_id: edge.task_id.to_string(),
            depends_on_id: edge.depends_on_id.to_string(),
            dep_type: edge.dep_type.to_string(),
            created_at: edge.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Argument parsing
// ============================================================================

/// Parse a dependency type string into a `DependencyType`.
#[must_use]
pub fn parse_dep_type(s: &str) -> Option<DependencyType> {
    match s.to_lowercase().as_str() {
        "blocks" => Some(DependencyType::Blocks),
        "relates_to" | "relates-to" | "related" => Some(DependencyType::RelatesTo),
        "duplicates" => Some(DependencyType::Duplicates),
        _ => None,
    }
}

/// Parse a format string into a `RenderFormat`.
#[must_use]
pub fn parse_render_format(s: &str) -> Option<RenderFormat> {
    match s.to_lowercase().as_str() {
        "tree" => Some(RenderFormat::Tree),
        "ascii" => Some(RenderFormat::Ascii),
        "dot" | "graphviz" => Some(RenderFormat::Dot),
        _ => None,
    }
}
