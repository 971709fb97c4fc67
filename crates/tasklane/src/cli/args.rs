//! Argument structs for each CLI command.

use clap::{Parser, Subcommand};

use super::types::{DependencyTypeArg, RenderFormatArg};
use super::validators::{validate_board_id, validate_task_id};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone, Default)]
pub struct InitArgs {
    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `critical-path` command
#[derive(Parser, Debug, Clone, Default)]
pub struct CriticalPathArgs {
    /// Only consider tasks on this board
    #[arg(short, long, value_parser = validate_board_id)]
    pub board: Option<String>,
}

/// Arguments for the `impact` command
#[derive(Parser, Debug, Clone)]
pub struct ImpactArgs {
    /// Task to analyse
    #[arg(value_parser = validate_task_id)]
    pub task: String,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Only show tasks on this board (defaults to the configured board)
    #[arg(short, long, value_parser = validate_board_id)]
    pub board: Option<String>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub format: Option<RenderFormatArg>,

    /// Show id, status, estimate and due date
    #[arg(short, long)]
    pub details: bool,

    /// Start the tree at this task
    #[arg(long, value_parser = validate_task_id)]
    pub root: Option<String>,

    /// Grow the tree towards dependencies instead of dependents
    #[arg(short, long)]
    pub upstream: bool,
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency subcommand
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add a dependency
    Add {
        /// Task that depends on another
        #[arg(value_parser = validate_task_id)]
        task: String,

        /// Task being depended on
        #[arg(value_parser = validate_task_id)]
        depends_on: String,

        /// Dependency type
        #[arg(short = 't', long = "type", value_enum, default_value = "blocks")]
        dep_type: DependencyTypeArg,
    },

    /// Remove a dependency
    Remove {
        /// Task that depends on another
        #[arg(value_parser = validate_task_id)]
        task: String,

        /// Task being depended on
        #[arg(value_parser = validate_task_id)]
        depends_on: String,
    },
}
