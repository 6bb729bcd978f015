//! MCP server implementation for Trellis
//!
//! Exposes the planner's operations as Model Context Protocol tools over
//! stdio so an assistant can build and track action plans.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use tokio::signal::unix::{SignalKind, signal};
use trellis_core::{Planner, params as core};

pub mod errors;
pub mod handlers;

use handlers::{McpHandlers, McpResult};

/// MCP server for Trellis
#[derive(Clone)]
pub struct TrellisMcpServer {
    planner: Arc<Planner>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TrellisMcpServer {
    /// Create a new Trellis MCP server
    pub fn new(planner: Planner) -> Self {
        Self {
            planner: Arc::new(planner),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> McpHandlers {
        McpHandlers::new(self.planner.clone())
    }

    #[tool(
        name = "create_plan",
        description = "Create an action plan for a user's analysis. Requires user_id, analysis_id, and title. Optionally seed phases, each with a name and template tasks. Only one plan may exist per user and analysis."
    )]
    async fn create_plan(&self, Parameters(params): Parameters<core::CreatePlan>) -> McpResult {
        self.handlers().create_plan(&params).await
    }

    #[tool(
        name = "show_plan",
        description = "Show a plan with its phases, tasks, statuses, completion percentages, and which tasks wait on which."
    )]
    async fn show_plan(&self, Parameters(params): Parameters<core::Id>) -> McpResult {
        self.handlers().show_plan(&params).await
    }

    #[tool(
        name = "list_plans",
        description = "List a user's plans, newest first, with task counts and overall completion. Optionally filter by status ('active', 'completed', 'archived')."
    )]
    async fn list_plans(&self, Parameters(params): Parameters<core::ListPlans>) -> McpResult {
        self.handlers().list_plans(&params).await
    }

    #[tool(
        name = "create_task",
        description = "Add a custom task to a phase of a plan. The phase must belong to the plan. The task starts as 'not_started' and goes after the phase's last task unless an order is given."
    )]
    async fn create_task(&self, Parameters(params): Parameters<core::CreateTask>) -> McpResult {
        self.handlers().create_task(&params).await
    }

    #[tool(
        name = "update_task",
        description = "Change a task's status ('not_started', 'in_progress', 'completed', 'skipped') or content. Completing a task whose prerequisites are not all completed fails unless override_prerequisites is true. Every status change records a progress snapshot."
    )]
    async fn update_task(&self, Parameters(params): Parameters<core::UpdateTask>) -> McpResult {
        self.handlers().update_task(&params).await
    }

    #[tool(
        name = "delete_task",
        description = "Delete a task together with every prerequisite edge that touches it. Phase and plan completion are recomputed."
    )]
    async fn delete_task(&self, Parameters(params): Parameters<core::Id>) -> McpResult {
        self.handlers().delete_task(&params).await
    }

    #[tool(
        name = "reorder_tasks",
        description = "Set the order of tasks within a phase. task_ids lists the phase's tasks in their new order; each may appear once and all must belong to the phase."
    )]
    async fn reorder_tasks(&self, Parameters(params): Parameters<core::ReorderTasks>) -> McpResult {
        self.handlers().reorder_tasks(&params).await
    }

    #[tool(
        name = "add_dependency",
        description = "Make task_id wait on prerequisite_task_id. Both tasks must be in the same plan. Rejected if it would make a task depend on itself, duplicate an existing edge, or close a cycle."
    )]
    async fn add_dependency(
        &self,
        Parameters(params): Parameters<core::AddDependency>,
    ) -> McpResult {
        self.handlers().add_dependency(&params).await
    }

    #[tool(
        name = "validate_dependency",
        description = "Check whether add_dependency would accept an edge, without changing anything. Returns the reason when it would be rejected."
    )]
    async fn validate_dependency(
        &self,
        Parameters(params): Parameters<core::AddDependency>,
    ) -> McpResult {
        self.handlers().validate_dependency(&params).await
    }

    #[tool(
        name = "remove_dependency",
        description = "Remove a prerequisite edge by its dependency ID."
    )]
    async fn remove_dependency(&self, Parameters(params): Parameters<core::Id>) -> McpResult {
        self.handlers().remove_dependency(&params).await
    }

    #[tool(
        name = "get_dependencies",
        description = "List the tasks a task waits on and the tasks waiting on it."
    )]
    async fn get_dependencies(&self, Parameters(params): Parameters<core::Id>) -> McpResult {
        self.handlers().get_dependencies(&params).await
    }

    #[tool(
        name = "incomplete_prerequisites",
        description = "List the prerequisites of a task that are not completed yet. Skipped prerequisites are included."
    )]
    async fn incomplete_prerequisites(
        &self,
        Parameters(params): Parameters<core::Id>,
    ) -> McpResult {
        self.handlers().incomplete_prerequisites(&params).await
    }

    #[tool(
        name = "progress_history",
        description = "Read a plan's progress snapshots, oldest first unless newest_first is true, optionally limited."
    )]
    async fn progress_history(
        &self,
        Parameters(params): Parameters<core::ProgressHistory>,
    ) -> McpResult {
        self.handlers().progress_history(&params).await
    }

    #[tool(
        name = "progress_summary",
        description = "Summarize a user's active plans: plan count, completed and total tasks, and average completion."
    )]
    async fn progress_summary(
        &self,
        Parameters(params): Parameters<core::UserProgress>,
    ) -> McpResult {
        self.handlers().progress_summary(&params).await
    }

    #[tool(
        name = "export_plan",
        description = "Export a plan as 'csv', 'json', or 'markdown'. Completed or skipped tasks can be left out with include_completed=false or include_skipped=false."
    )]
    async fn export_plan(&self, Parameters(params): Parameters<core::ExportPlan>) -> McpResult {
        self.handlers().export_plan(&params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TrellisMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "trellis".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(r#"Trellis tracks action plans made of ordered phases of tasks.

## Core Concepts
- **Plans** belong to a user's analysis (one plan per analysis) and have a status: active, completed, or archived
- **Tasks** live in a phase and move between not_started, in_progress, completed, and skipped
- **Dependencies** make one task wait on another in the same plan; they can never form a cycle
- **Progress**: a phase's completion is the share of its tasks that are completed; a plan's is the mean of its phases

## Workflow
1. `create_plan`, optionally with template phases and tasks
2. `add_dependency` to order the work; `validate_dependency` to check an edge first
3. `update_task` as work progresses; `incomplete_prerequisites` explains a refused completion
4. `progress_history` and `progress_summary` to review progress, `export_plan` to share it"#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: TrellisMcpServer) -> Result<()> {
    use rmcp::{ServiceExt, transport::stdio};

    info!("Starting Trellis MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
