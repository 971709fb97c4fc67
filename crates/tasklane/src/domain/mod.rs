//! Domain types for the dependency engine.
//!
//! Tasks and boards are owned by the external task store. The engine only
//! ever sees read-only [`TaskNode`] copies and [`DependencyEdge`] records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight used for a task that has no usable duration estimate, in hours.
pub const DEFAULT_TASK_WEIGHT: f64 = 1.0;

/// Unique identifier for a task
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create a new task ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a board
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoardId(String);

impl BoardId {
    /// Create a new board ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BoardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BoardId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Currently being worked on
    InProgress,

    /// Completed
    Done,

    /// Waiting on something outside the task itself
    Blocked,

    /// Shelved; kept for history only
    Archived,
}

impl TaskStatus {
    /// Whether the task no longer represents outstanding work.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Archived)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
            Self::Archived => "archived",
        };
        f.write_str(s)
    }
}

/// Type of dependency relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Hard blocker; the only type that takes part in scheduling
    Blocks,

    /// Soft link - informational
    RelatesTo,

    /// Marks the task as a duplicate of another - informational
    Duplicates,
}

impl DependencyType {
    /// Whether edges of this type take part in cycle detection and
    /// critical-path computation.
    #[must_use]
    pub fn is_scheduling(self) -> bool {
        self == Self::Blocks
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Blocks => "blocks",
            Self::RelatesTo => "relates_to",
            Self::Duplicates => "duplicates",
        };
        f.write_str(s)
    }
}

/// A task as seen by the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Unique identifier for the task
    pub id: TaskId,

    /// Task title
    pub title: String,

    /// Current status
    pub status: TaskStatus,

    /// Priority level (higher is more urgent)
    #[serde(default)]
    pub priority: u8,

    /// Estimated effort in hours
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,

    /// Due date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Board the task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board_id: Option<BoardId>,
}

impl TaskNode {
    /// Create a `todo` task with no estimate, due date or board.
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::Todo,
            priority: 0,
            estimated_hours: None,
            due_date: None,
            board_id: None,
        }
    }

    /// Builder-style setter for the status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder-style setter for the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Builder-style setter for the estimate.
    #[must_use]
    pub fn with_estimate(mut self, hours: f64) -> Self {
        self.estimated_hours = Some(hours);
        self
    }

    /// Builder-style setter for the due date.
    #[must_use]
    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    /// Builder-style setter for the board.
    #[must_use]
    pub fn with_board(mut self, board: impl Into<BoardId>) -> Self {
        self.board_id = Some(board.into());
        self
    }

    /// Scheduling weight of the task in hours.
    ///
    /// Falls back to [`DEFAULT_TASK_WEIGHT`] when the estimate is missing.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.estimated_hours.unwrap_or(DEFAULT_TASK_WEIGHT)
    }

    /// Whether the task is past its due date on `today` and still open.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < today)
    }

    /// Whether the estimate, if present, is a usable duration.
    #[must_use]
    pub fn has_valid_estimate(&self) -> bool {
        self.estimated_hours
            .is_none_or(|hours| hours.is_finite() && hours >= 0.0)
    }
}

/// Directed relation `task_id depends_on depends_on_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The dependent task
    pub task_id: TaskId,

    /// The task being depended upon
    pub depends_on_id: TaskId,

    /// Type of dependency
    pub dep_type: DependencyType,

    /// When the dependency was recorded
    pub created_at: DateTime<Utc>,
}

impl DependencyEdge {
    /// Create an edge stamped with the current time.
    pub fn new(
        task_id: impl Into<TaskId>,
        depends_on_id: impl Into<TaskId>,
        dep_type: DependencyType,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            depends_on_id: depends_on_id.into(),
            dep_type,
            created_at: Utc::now(),
        }
    }

    /// Whether the edge connects the given ordered pair.
    #[must_use]
    pub fn connects(&self, task_id: &TaskId, depends_on_id: &TaskId) -> bool {
        &self.task_id == task_id && &self.depends_on_id == depends_on_id
    }
}

/// A request to record `task_id depends_on depends_on_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDependency {
    /// The dependent task
    pub task_id: TaskId,

    /// The task being depended upon
    pub depends_on_id: TaskId,

    /// Type of dependency
    pub dep_type: DependencyType,
}

impl NewDependency {
    /// Create a new dependency request.
    pub fn new(
        task_id: impl Into<TaskId>,
        depends_on_id: impl Into<TaskId>,
        dep_type: DependencyType,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            depends_on_id: depends_on_id.into(),
            dep_type,
        }
    }
}
