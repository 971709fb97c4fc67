//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a workspace
//! - `critical-path`: Show the longest chain of open work
//! - `impact`: Show what a task holds up
//! - `graph`: Render the dependency graph (tree, ascii or dot)
//! - `dep add` / `dep remove`: Manage dependencies
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! tasklane dep add web-2 api-1
//! tasklane critical-path --board web
//! tasklane graph --format dot | dot -Tsvg > graph.svg
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{CriticalPathArgs, DepAction, DepArgs, GraphArgs, ImpactArgs, InitArgs};
pub use types::{DependencyTypeArg, RenderFormatArg};
pub use validators::{validate_board_id, validate_task_id};

/// Tasklane - task dependency graph and critical-path analysis
///
/// Reads tasks from `.tasklane/tasks.jsonl`, keeps their `blocks`
/// dependencies acyclic, and reports critical paths and impact.
#[derive(Parser, Debug)]
#[command(name = "tasklane")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new workspace
    ///
    /// Creates `.tasklane/` with a configuration file and an empty data file.
    Init(InitArgs),

    /// Show the critical path
    ///
    /// Lists the longest chain of open work by estimated hours, the tasks
    /// that can start now, and the bottlenecks holding up several others.
    CriticalPath(CriticalPathArgs),

    /// Show the impact of a task
    ///
    /// Lists every task that directly or transitively depends on it.
    Impact(ImpactArgs),

    /// Render the dependency graph
    Graph(GraphArgs),

    /// Add or remove a dependency between tasks
    Dep(DepArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::CriticalPath(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_critical_path(&app, args, output_mode).await
            }
            Some(Commands::Impact(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_impact(&app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_dep(&app, args, output_mode).await
            }
            None => {
                println!("Tasklane dependency engine");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_command() {
        let cli = Cli::try_parse_from(["tasklane"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_global_json_flag() {
        let cli = Cli::try_parse_from(["tasklane", "critical-path", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::CriticalPath(_))));
    }

    #[test]
    fn test_parse_critical_path_board() {
        let cli = Cli::try_parse_from(["tasklane", "critical-path", "--board", "web"]).unwrap();
        match cli.command {
            Some(Commands::CriticalPath(args)) => assert_eq!(args.board.as_deref(), Some("web")),
            _ => panic!("Expected CriticalPath command"),
        }
    }

    #[test]
    fn test_parse_impact() {
        let cli = Cli::try_parse_from(["tasklane", "impact", "api-1"]).unwrap();
        match cli.command {
            Some(Commands::Impact(args)) => assert_eq!(args.task, "api-1"),
            _ => panic!("Expected Impact command"),
        }
    }

    #[test]
    fn test_parse_impact_requires_task() {
        assert!(Cli::try_parse_from(["tasklane", "impact"]).is_err());
    }

    #[test]
    fn test_parse_graph_defaults() {
        let cli = Cli::try_parse_from(["tasklane", "graph"]).unwrap();
        match cli.command {
            Some(Commands::Graph(args)) => {
                assert!(args.format.is_none());
                assert!(!args.details);
                assert!(!args.upstream);
                assert!(args.root.is_none());
            }
            _ => panic!("Expected Graph command"),
        }
    }

    #[test]
    fn test_parse_graph_all_options() {
        let cli = Cli::try_parse_from([
            "tasklane", "graph", "--format", "dot", "--details", "--root", "t-1", "--upstream",
            "-b", "ops",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Graph(args)) => {
                assert_eq!(args.format, Some(RenderFormatArg::Dot));
                assert!(args.details);
                assert!(args.upstream);
                assert_eq!(args.root.as_deref(), Some("t-1"));
                assert_eq!(args.board.as_deref(), Some("ops"));
            }
            _ => panic!("Expected Graph command"),
        }
    }

    #[test]
    fn test_parse_graph_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["tasklane", "graph", "--format", "svg"]).is_err());
    }

    #[test]
    fn test_parse_dep_add_default_type() {
        let cli = Cli::try_parse_from(["tasklane", "dep", "add", "b", "a"]).unwrap();
        match cli.command {
            Some(Commands::Dep(DepArgs {
                action:
                    DepAction::Add {
                        task,
                        depends_on,
                        dep_type,
                    },
            })) => {
                assert_eq!(task, "b");
                assert_eq!(depends_on, "a");
                assert_eq!(dep_type, DependencyTypeArg::Blocks);
            }
            _ => panic!("Expected Dep Add command"),
        }
    }

    #[test]
    fn test_parse_dep_add_relates_to() {
        let cli =
            Cli::try_parse_from(["tasklane", "dep", "add", "b", "a", "--type", "relates-to"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Dep(DepArgs {
                action: DepAction::Add {
                    dep_type: DependencyTypeArg::RelatesTo,
                    ..
                }
            }))
        ));
    }

    #[test]
    fn test_parse_dep_remove() {
        let cli = Cli::try_parse_from(["tasklane", "dep", "remove", "b", "a"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Dep(DepArgs {
                action: DepAction::Remove { .. }
            }))
        ));
    }

    #[test]
    fn test_parse_rejects_blank_task_id() {
        assert!(Cli::try_parse_from(["tasklane", "impact", "  "]).is_err());
    }
}
