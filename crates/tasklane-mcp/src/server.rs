//! MCP server implementation.
//!
//! This module contains the main server setup using rmcp.

use crate::context::Context;
use crate::models::{
    AddDependencyParams, CriticalPathParams, ImpactParams, RemoveDependencyParams,
    SetContextParams, VisualizeParams,
};
use crate::tools::Tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::transport::stdio;
use rmcp::{
    ErrorData as McpError, ServiceExt, handler::server::ServerHandler, tool, tool_handler,
    tool_router,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Map a tool error onto an MCP error.
///
/// Bad arguments and rejected edits are the caller's fault; everything
/// else is reported as internal.
fn to_mcp_error(err: &crate::Error) -> McpError {
    use crate::Error;
    use tasklane::Error as EngineError;

    match err {
        Error::InvalidArgument { .. }
        | Error::NoContext
        | Error::Engine(
            EngineError::TaskNotFound(_)
            | EngineError::SelfDependency(_)
            | EngineError::CycleDetected { .. }
            | EngineError::DuplicateDependency { .. }
            | EngineError::DependencyNotFound { .. },
        ) => McpError::invalid_params(err.to_string(), None),
        _ => McpError::internal_error(err.to_string(), None),
    }
}

/// The tasklane MCP server.
///
/// Provides MCP protocol handling over stdio transport.
#[derive(Clone)]
pub struct TasklaneMcpServer {
    /// Shared context for workspace management.
    context: Arc<RwLock<Context>>,
    /// Tool implementations.
    tools: Arc<Tools>,
    /// Tool router for MCP dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TasklaneMcpServer {
    /// Set the workspace context for subsequent operations.
    #[tool(
        description = "Set the workspace root directory for all subsequent operations. Call this first before using other tools."
    )]
    async fn set_context(
        &self,
        Parameters(params): Parameters<SetContextParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.tools.set_context(&params.workspace_root).await {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Get current workspace context information.
    #[tool(description = "Show current workspace context and data file path. Useful for debugging.")]
    async fn where_am_i(&self) -> Result<CallToolResult, McpError> {
        match self.tools.where_am_i().await {
            Ok(response) => Ok(CallToolResult::success(vec![Content::json(response)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Compute the critical path.
    #[tool(
        description = "Find the longest chain of open work by estimated hours, plus the tasks that can start now and the bottlenecks holding up several tasks."
    )]
    async fn critical_path(
        &self,
        Parameters(params): Parameters<CriticalPathParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .critical_path(params.board.as_deref(), params.workspace_root.as_deref())
            .await
        {
            Ok(path) => Ok(CallToolResult::success(vec![Content::json(path)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Analyze a task's impact.
    #[tool(
        description = "List every task that directly or transitively depends on a task, with a LOW/MEDIUM/HIGH risk rating."
    )]
    async fn impact(
        &self,
        Parameters(params): Parameters<ImpactParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .impact(&params.task_id, params.workspace_root.as_deref())
            .await
        {
            Ok(impact) => Ok(CallToolResult::success(vec![Content::json(impact)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Render the dependency graph.
    #[tool(
        description = "Render the dependency graph as an indented tree, an ASCII critical-path chain, or Graphviz DOT."
    )]
    async fn visualize(
        &self,
        Parameters(params): Parameters<VisualizeParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .visualize(
                params.format.as_deref(),
                params.board.as_deref(),
                params.root.as_deref(),
                params.upstream,
                params.show_details,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(response) => Ok(CallToolResult::success(vec![Content::text(response.output)])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Add a dependency between tasks.
    #[tool(
        description = "Record that task_id depends on depends_on_id. Types: blocks (default, must stay acyclic), relates_to, duplicates."
    )]
    async fn add_dependency(
        &self,
        Parameters(params): Parameters<AddDependencyParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .add_dependency(
                &params.task_id,
                &params.depends_on_id,
                params.dep_type.as_deref(),
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(edge) => Ok(CallToolResult::success(vec![Content::json(edge)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }

    /// Remove a dependency between tasks.
    #[tool(description = "Delete the dependency of task_id on depends_on_id.")]
    async fn remove_dependency(
        &self,
        Parameters(params): Parameters<RemoveDependencyParams>,
    ) -> Result<CallToolResult, McpError> {
        match self
            .tools
            .remove_dependency(
                &params.task_id,
                &params.depends_on_id,
                params.workspace_root.as_deref(),
            )
            .await
        {
            Ok(edge) => Ok(CallToolResult::success(vec![Content::json(edge)?])),
            Err(e) => Err(to_mcp_error(&e)),
        }
    }
}

impl TasklaneMcpServer {
    /// Create a new tasklane MCP server.
    #[must_use]
    pub fn new() -> Self {
        let context = Arc::new(RwLock::new(Context::new()));
        let tools = Arc::new(Tools::new(Arc::clone(&context)));

        Self {
            context,
            tools,
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the context.
    #[must_use]
    pub fn context(&self) -> &Arc<RwLock<Context>> {
        &self.context
    }

    /// Serve requests over stdin/stdout until the client disconnects.
    ///
    /// # Errors
    ///
    /// Returns an error if the MCP handshake fails or the service task panics.
    pub async fn run(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        let reason = service.waiting().await?;
        tracing::info!(?reason, "tasklane-mcp server stopped");
        Ok(())
    }
}

impl Default for TasklaneMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for TasklaneMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tasklane-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tasklane MCP server for task dependency analysis. Call set_context first to set the workspace."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use tasklane::domain::TaskId;

    #[test]
    fn test_server_creation() {
        let server = TasklaneMcpServer::new();
        assert!(server.context().try_read().is_ok());
    }

    #[test]
    fn test_server_info() {
        let server = TasklaneMcpServer::default();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "tasklane-mcp");
        assert!(!info.server_info.version.is_empty());
        assert!(info.instructions.is_some());
    }

    #[test]
    fn test_tool_router_has_all_tools() {
        let server = TasklaneMcpServer::new();
        let tools = server.tool_router.list_all();
        let tool_names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();

        for name in [
            "set_context",
            "where_am_i",
            "critical_path",
            "impact",
            "visualize",
            "add_dependency",
            "remove_dependency",
        ] {
            assert!(tool_names.contains(&name), "missing tool {name}");
        }
        assert_eq!(tools.len(), 7);
    }

    #[test]
    fn test_rejections_are_invalid_params() {
        let cycle = crate::Error::Engine(tasklane::Error::CycleDetected {
            from: TaskId::new("a"),
            to: TaskId::new("b"),
            path: vec![TaskId::new("a"), TaskId::new("b"), TaskId::new("a")],
        });
        assert_eq!(to_mcp_error(&cycle).code, ErrorCode::INVALID_PARAMS);

        let io = crate::Error::Io(std::io::Error::other("disk"));
        assert_eq!(to_mcp_error(&io).code, ErrorCode::INTERNAL_ERROR);
    }
}
