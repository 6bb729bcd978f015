//! Parameter structures for Trellis operations
//!
//! Shared request structures used by every interface (CLI, MCP, or an
//! embedding HTTP layer). They carry no framework-specific derives apart from
//! serde and, behind the `schema` feature, `schemars::JsonSchema`.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Enumerated values (statuses, export formats) arrive as strings and are
//! parsed by the `validate` methods, so an unknown value becomes a
//! [`PlannerError::InvalidInput`] before any mutation is attempted.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PlannerError, Result},
    models::{PlanStatus, TaskStatus},
};

fn default_true() -> bool {
    true
}

/// Rejects empty or whitespace-only text.
pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlannerError::invalid_input(field).with_reason("must not be empty"));
    }
    Ok(())
}

/// Generic parameters for operations requiring just an ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: u64,
}

/// Task template seeded into a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct TaskTemplate {
    /// Title of the task
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional free-text effort estimate
    pub estimated_time: Option<String>,
    /// Resource links
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Phase template seeded into a new plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PhaseTemplate {
    /// Name of the phase
    pub name: String,
    /// Tasks in display order
    #[serde(default)]
    pub tasks: Vec<TaskTemplate>,
}

/// Parameters for creating a new plan.
///
/// At most one plan may exist per (user, analysis) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlan {
    /// Owning user
    pub user_id: u64,
    /// Analysis the plan belongs to
    pub analysis_id: u64,
    /// Title of the plan (required)
    pub title: String,
    /// Optional detailed description of the plan
    pub description: Option<String>,
    /// Optional template phases; seeded tasks are not custom
    #[serde(default)]
    pub phases: Vec<PhaseTemplate>,
}

impl CreatePlan {
    /// Validate titles and names before anything is written.
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        for phase in &self.phases {
            require_text("phases.name", &phase.name)?;
            for task in &phase.tasks {
                require_text("phases.tasks.title", &task.title)?;
            }
        }
        Ok(())
    }
}

/// Parameters for looking up a plan by its analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PlanByAnalysis {
    /// Owning user
    pub user_id: u64,
    /// Analysis ID
    pub analysis_id: u64,
}

/// Parameters for listing a user's plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListPlans {
    /// Owning user
    pub user_id: u64,
    /// Optional status filter ('active', 'completed', 'archived')
    pub status: Option<String>,
}

impl ListPlans {
    /// Parse the optional status filter.
    pub fn validate(&self) -> Result<Option<PlanStatus>> {
        parse_plan_status(self.status.as_deref())
    }
}

/// Parameters for updating plan metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdatePlan {
    /// Plan ID to update
    pub id: u64,
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New status ('active', 'completed', 'archived')
    pub status: Option<String>,
}

impl UpdatePlan {
    /// Validate the title and parse the status.
    pub fn validate(&self) -> Result<Option<PlanStatus>> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        parse_plan_status(self.status.as_deref())
    }
}

fn parse_plan_status(status: Option<&str>) -> Result<Option<PlanStatus>> {
    status
        .map(|s| {
            s.parse::<PlanStatus>().map_err(|_| {
                PlannerError::invalid_input("status").with_reason(format!(
                    "Invalid status: {s}. Must be 'active', 'completed', or 'archived'"
                ))
            })
        })
        .transpose()
}

/// Parameters for adding a phase to a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePhase {
    /// Plan to add the phase to
    pub plan_id: u64,
    /// Name of the phase
    pub name: String,
    /// Explicit order; defaults to after the last phase
    pub order: Option<u32>,
}

/// Parameters for creating a custom task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateTask {
    /// Plan the task belongs to
    pub plan_id: u64,
    /// Phase of that plan to put the task in
    pub phase_id: u64,
    /// Title of the task (required)
    pub title: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Optional free-text effort estimate
    pub estimated_time: Option<String>,
    /// Resource links
    #[serde(default)]
    pub resources: Vec<String>,
    /// Explicit order within the phase; defaults to after the last task
    pub order: Option<u32>,
}

/// Parameters for updating an existing task.
///
/// Completing a task whose prerequisites are still open is rejected unless
/// `override_prerequisites` is set for this call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateTask {
    /// Task ID to update (required)
    pub id: u64,
    /// Acting user, recorded as `completed_by` on completion
    pub user_id: Option<u64>,
    /// New status ('not_started', 'in_progress', 'completed', 'skipped')
    pub status: Option<String>,
    /// Updated title
    pub title: Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Updated effort estimate
    pub estimated_time: Option<String>,
    /// Updated resource links
    pub resources: Option<Vec<String>>,
    /// Complete even when prerequisites are incomplete
    #[serde(default)]
    pub override_prerequisites: bool,
}

impl UpdateTask {
    /// Validate the title and parse the status string.
    pub fn validate(&self) -> Result<Option<TaskStatus>> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        self.status
            .as_deref()
            .map(|s| {
                s.parse::<TaskStatus>().map_err(|_| {
                    PlannerError::invalid_input("status").with_reason(format!(
                        "Invalid status: {s}. Must be 'not_started', 'in_progress', 'completed', or 'skipped'"
                    ))
                })
            })
            .transpose()
    }
}

/// Parameters for reordering tasks within a phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReorderTasks {
    /// Phase whose tasks are reordered
    pub phase_id: u64,
    /// Task IDs in their new order
    pub task_ids: Vec<u64>,
}

/// Parameters naming a prospective or existing prerequisite edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddDependency {
    /// Task that will wait on the prerequisite
    pub task_id: u64,
    /// Task that must be completed first
    pub prerequisite_task_id: u64,
}

/// Parameters for reading progress history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ProgressHistory {
    /// Plan ID
    pub plan_id: u64,
    /// Return newest snapshots first
    #[serde(default)]
    pub newest_first: bool,
    /// Maximum number of snapshots to return
    pub limit: Option<u32>,
}

/// Parameters for the cross-plan dashboard summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UserProgress {
    /// User ID
    pub user_id: u64,
}

/// Parameters for exporting a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ExportPlan {
    /// Plan ID
    pub plan_id: u64,
    /// Output format ('csv', 'json', or 'markdown')
    pub format: String,
    /// Include completed tasks
    #[serde(default = "default_true")]
    pub include_completed: bool,
    /// Include skipped tasks
    #[serde(default = "default_true")]
    pub include_skipped: bool,
}

impl Default for ExportPlan {
    fn default() -> Self {
        Self {
            plan_id: 0,
            format: "markdown".to_string(),
            include_completed: true,
            include_skipped: true,
        }
    }
}
