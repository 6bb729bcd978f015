//! Progress snapshot and summary types.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Plan, PlanStatus};

/// Immutable record of a plan's completion state at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSnapshot {
    /// Unique identifier for the snapshot
    pub id: u64,

    /// Plan the snapshot belongs to
    pub plan_id: u64,

    /// Task whose status change produced this snapshot
    pub task_id: Option<u64>,

    /// IDs of every completed task, ascending
    pub completed_task_ids: Vec<u64>,

    /// Completion percentage per phase ID
    pub phase_completion: BTreeMap<u64, u8>,

    /// Mean of the phase percentages
    pub overall_completion: u8,

    /// When the snapshot was taken (UTC)
    pub created_at: Timestamp,
}

/// Summary information about a plan with task statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    /// Plan ID
    pub id: u64,
    /// Owning user
    pub user_id: u64,
    /// Source analysis
    pub analysis_id: u64,
    /// Title of the plan
    pub title: String,
    /// Detailed multi-line description of the plan
    pub description: Option<String>,
    /// Plan status
    pub status: PlanStatus,
    /// Overall completion percentage
    pub completion: u8,
    /// Creation timestamp
    pub created_at: Timestamp,
    /// Last update timestamp
    pub updated_at: Timestamp,
    /// Number of phases
    pub total_phases: u32,
    /// Total number of tasks
    pub total_tasks: u32,
    /// Number of completed tasks
    pub completed_tasks: u32,
}

/// Cross-plan dashboard rollup for one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProgressSummary {
    /// The user the summary was computed for
    pub user_id: u64,
    /// Number of active plans
    pub active_plans: u32,
    /// Tasks across all active plans
    pub total_tasks: u32,
    /// Completed tasks across all active plans
    pub completed_tasks: u32,
    /// Mean completion of the active plans
    pub average_completion: u8,
    /// Per-plan rollups
    pub plans: Vec<PlanSummary>,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let total_tasks = plan.tasks().count() as u32;
        let completed_tasks = plan
            .tasks()
            .filter(|task| task.status.is_completed())
            .count() as u32;

        Self {
            id: plan.id,
            user_id: plan.user_id,
            analysis_id: plan.analysis_id,
            title: plan.title.clone(),
            description: plan.description.clone(),
            status: plan.status,
            completion: plan.completion,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            total_phases: plan.phases.len() as u32,
            total_tasks,
            completed_tasks,
        }
    }
}
