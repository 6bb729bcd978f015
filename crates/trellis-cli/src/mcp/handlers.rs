//! MCP tool handlers implementation
//!
//! Every handler calls one planner operation and returns its markdown view
//! as a single text content block, the same text the CLI renders.

use std::sync::Arc;

use log::debug;
use rmcp::{
    ErrorData,
    model::{CallToolResult, Content},
};
use trellis_core::{
    CreateResult, DeleteResult, PlanSummaries, Planner, ProgressHistory, Tasks, UpdateResult,
    display::OperationStatus,
    params as core,
};

use super::errors::to_mcp_error;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(body: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(body.to_string())]))
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    planner: Arc<Planner>,
}

impl McpHandlers {
    pub fn new(planner: Arc<Planner>) -> Self {
        Self { planner }
    }

    pub async fn create_plan(&self, params: &core::CreatePlan) -> McpResult {
        debug!("create_plan: {params:?}");
        let plan = self
            .planner
            .create_plan(params)
            .await
            .map_err(|e| to_mcp_error("Failed to create plan", &e))?;
        text(CreateResult::new(plan))
    }

    pub async fn show_plan(&self, params: &core::Id) -> McpResult {
        debug!("show_plan: {params:?}");
        let plan = self
            .planner
            .show_plan(params)
            .await
            .map_err(|e| to_mcp_error("Failed to get plan", &e))?;
        text(plan)
    }

    pub async fn list_plans(&self, params: &core::ListPlans) -> McpResult {
        debug!("list_plans: {params:?}");
        let plans = self
            .planner
            .list_plans(params)
            .await
            .map_err(|e| to_mcp_error("Failed to list plans", &e))?;
        text(PlanSummaries(plans))
    }

    pub async fn create_task(&self, params: &core::CreateTask) -> McpResult {
        debug!("create_task: {params:?}");
        let task = self
            .planner
            .create_task(params)
            .await
            .map_err(|e| to_mcp_error("Failed to create task", &e))?;
        text(CreateResult::new(task))
    }

    pub async fn update_task(&self, params: &core::UpdateTask) -> McpResult {
        debug!("update_task: {params:?}");
        let task = self
            .planner
            .update_task(params)
            .await
            .map_err(|e| to_mcp_error("Failed to update task", &e))?;
        text(UpdateResult::new(task))
    }

    pub async fn delete_task(&self, params: &core::Id) -> McpResult {
        debug!("delete_task: {params:?}");
        let task = self
            .planner
            .delete_task(params)
            .await
            .map_err(|e| to_mcp_error("Failed to delete task", &e))?;
        text(DeleteResult::new(task))
    }

    pub async fn reorder_tasks(&self, params: &core::ReorderTasks) -> McpResult {
        debug!("reorder_tasks: {params:?}");
        let tasks = self
            .planner
            .reorder_tasks(params)
            .await
            .map_err(|e| to_mcp_error("Failed to reorder tasks", &e))?;
        text(Tasks(tasks))
    }

    pub async fn add_dependency(&self, params: &core::AddDependency) -> McpResult {
        debug!("add_dependency: {params:?}");
        let edge = self
            .planner
            .add_dependency(params)
            .await
            .map_err(|e| to_mcp_error("Failed to add dependency", &e))?;
        text(CreateResult::new(edge))
    }

    pub async fn validate_dependency(&self, params: &core::AddDependency) -> McpResult {
        debug!("validate_dependency: {params:?}");
        let check = self
            .planner
            .validate_dependency(params)
            .await
            .map_err(|e| to_mcp_error("Failed to validate dependency", &e))?;
        text(check)
    }

    pub async fn remove_dependency(&self, params: &core::Id) -> McpResult {
        debug!("remove_dependency: {params:?}");
        let edge = self
            .planner
            .remove_dependency(params)
            .await
            .map_err(|e| to_mcp_error("Failed to remove dependency", &e))?;
        text(DeleteResult::new(edge))
    }

    pub async fn get_dependencies(&self, params: &core::Id) -> McpResult {
        debug!("get_dependencies: {params:?}");
        let deps = self
            .planner
            .get_dependencies(params)
            .await
            .map_err(|e| to_mcp_error("Failed to get dependencies", &e))?;
        text(deps)
    }

    pub async fn incomplete_prerequisites(&self, params: &core::Id) -> McpResult {
        debug!("incomplete_prerequisites: {params:?}");
        let tasks = self
            .planner
            .get_incomplete_prerequisites(params)
            .await
            .map_err(|e| to_mcp_error("Failed to get prerequisites", &e))?;
        if tasks.is_empty() {
            return text(OperationStatus::success(format!(
                "Task {} has no incomplete prerequisites",
                params.id
            )));
        }
        text(Tasks(tasks))
    }

    pub async fn progress_history(&self, params: &core::ProgressHistory) -> McpResult {
        debug!("progress_history: {params:?}");
        let history = self
            .planner
            .progress_history(params)
            .await
            .map_err(|e| to_mcp_error("Failed to get progress history", &e))?;
        text(ProgressHistory(history))
    }

    pub async fn progress_summary(&self, params: &core::UserProgress) -> McpResult {
        debug!("progress_summary: {params:?}");
        let summary = self
            .planner
            .user_progress_summary(params)
            .await
            .map_err(|e| to_mcp_error("Failed to summarize progress", &e))?;
        text(summary)
    }

    pub async fn export_plan(&self, params: &core::ExportPlan) -> McpResult {
        debug!("export_plan: {params:?}");
        let output = self
            .planner
            .export_plan(params)
            .await
            .map_err(|e| to_mcp_error("Failed to export plan", &e))?;
        text(output)
    }
}
