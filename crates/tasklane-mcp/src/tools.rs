//! MCP tool implementations.
//!
//! Each tool resolves a [`Workspace`](crate::context::Workspace) from the
//! shared context, releases the context lock, and then calls the engine.

use crate::context::{Context, Workspace};
use crate::error::{Error, Result};
use crate::models::{
    CriticalPathResponse, ImpactResponse, McpDependency, SetContextResponse, VisualizeResponse,
    WhereAmIResponse, parse_dep_type, parse_render_format,
};
use std::path::Path;
use std::sync::Arc;
use tasklane::domain::{BoardId, DependencyType, NewDependency, TaskId};
use tasklane::render::{RenderOptions, TreeDirection};
use tokio::sync::RwLock;

/// Tool implementations for the tasklane MCP server.
pub struct Tools {
    context: Arc<RwLock<Context>>,
}

impl Tools {
    /// Create a new Tools instance with the given context.
    pub fn new(context: Arc<RwLock<Context>>) -> Self {
        Self { context }
    }

    async fn workspace(&self, workspace_root: Option<&str>) -> Result<Arc<Workspace>> {
        let context = self.context.read().await;
        context.workspace_for(workspace_root.map(Path::new))
    }

    /// Set the workspace context.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace path is invalid or has no `.tasklane/` directory.
    pub async fn set_context(&self, workspace_root: &str) -> Result<SetContextResponse> {
        let path = Path::new(workspace_root);
        let mut context = self.context.write().await;
        let info = context.set_workspace(path).await?;

        Ok(SetContextResponse {
            workspace_root: info.workspace_root.display().to_string(),
            data_path: info.data_path.display().to_string(),
            warnings: info.warnings,
            message: "Context set successfully".to_string(),
        })
    }

    /// Get current workspace information.
    ///
    /// # Errors
    ///
    /// This function does not currently return errors but returns `Result` for API consistency.
    pub async fn where_am_i(&self) -> Result<WhereAmIResponse> {
        let context = self.context.read().await;

        Ok(WhereAmIResponse {
            workspace_root: context.current_workspace().map(|p| p.display().to_string()),
            data_path: context.current_data_path().map(|p| p.display().to_string()),
            context_set: context.current_workspace().is_some(),
        })
    }

    /// Compute the critical path.
    ///
    /// Falls back to the workspace's configured board when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if no context is set or the analysis fails.
    pub async fn critical_path(
        &self,
        board: Option<&str>,
        workspace_root: Option<&str>,
    ) -> Result<CriticalPathResponse> {
        let workspace = self.workspace(workspace_root).await?;
        let board = board
            .map(BoardId::new)
            .or_else(|| workspace.config.board.clone());

        let path = workspace.engine.critical_path(board.as_ref()).await?;
        Ok(path.into())
    }

    /// Analyze what a task holds up.
    ///
    /// # Errors
    ///
    /// Returns an error if no context is set or the task does not exist.
    pub async fn impact(&self, task_id: &str, workspace_root: Option<&str>) -> Result<ImpactResponse> {
        let workspace = self.workspace(workspace_root).await?;
        let impact = workspace.engine.impact(&TaskId::new(task_id)).await?;
        Ok(impact.into())
    }

    /// Render the dependency graph.
    ///
    /// Unset options fall back to the workspace's render settings and default
    /// board. Output is never colored.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an unknown format, or an engine error.
    pub async fn visualize(
        &self,
        format: Option<&str>,
        board: Option<&str>,
        root: Option<&str>,
        upstream: Option<bool>,
        show_details: Option<bool>,
        workspace_root: Option<&str>,
    ) -> Result<VisualizeResponse> {
        let workspace = self.workspace(workspace_root).await?;
        let defaults = &workspace.config.render;

        let format = match format {
            Some(value) => parse_render_format(value).ok_or_else(|| Error::InvalidArgument {
                field: "format",
                value: value.to_string(),
                valid_values: "tree, ascii, dot",
            })?,
            None => defaults.format,
        };

        let mut options = RenderOptions::new(format);
        options.use_colors = false;
        options.show_task_details = show_details.unwrap_or(defaults.show_task_details);
        options.board = board
            .map(BoardId::new)
            .or_else(|| workspace.config.board.clone());
        options.root = root.map(TaskId::new);
        if upstream.unwrap_or(false) {
            options.direction = TreeDirection::Dependencies;
        }

        let output = workspace.engine.visualize(&options).await?;
        Ok(VisualizeResponse {
            format: format.to_string(),
            board: options.board.map(|b| b.to_string()),
            output,
        })
    }

    /// Record a dependency.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` for an unknown type, or the engine's
    /// rejection (self dependency, unknown task, cycle, duplicate).
    pub async fn add_dependency(
        &self,
        task_id: &str,
        depends_on_id: &str,
        dep_type: Option<&str>,
        workspace_root: Option<&str>,
    ) -> Result<McpDependency> {
        let dep_type = match dep_type {
            Some(value) => parse_dep_type(value).ok_or_else(|| Error::InvalidArgument {
                field: "dep_type",
                value: value.to_string(),
                valid_values: "blocks, relates_to, duplicates",
            })?,
            None => DependencyType::Blocks,
        };

        let workspace = self.workspace(workspace_root).await?;
        let edge = workspace
            .engine
            .add_dependency(NewDependency::new(task_id, depends_on_id, dep_type))
            .await?;
        Ok(edge.into())
    }

    /// Delete a dependency.
    ///
    /// # Errors
    ///
    /// Returns an error if no context is set or the dependency does not exist.
    pub async fn remove_dependency(
        &self,
        task_id: &str,
        depends_on_id: &str,
        workspace_root: Option<&str>,
    ) -> Result<McpDependency> {
        let workspace = self.workspace(workspace_root).await?;
        let edge = workspace
            .engine
            .remove_dependency(&TaskId::new(task_id), &TaskId::new(depends_on_id))
            .await?;
        Ok(edge.into())
    }
}
