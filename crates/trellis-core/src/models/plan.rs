//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Phase, PlanStatus, Task, TaskDependency};

/// A user's action plan for one analysis.
///
/// Phases, their tasks, and the plan's dependency edges are eagerly loaded
/// by [`crate::Database::get_plan`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: u64,

    /// ID of the owning user
    pub user_id: u64,

    /// ID of the analysis this plan was generated for
    pub analysis_id: u64,

    /// Title of the plan
    pub title: String,

    /// Detailed multi-line description of the plan
    pub description: Option<String>,

    /// Lifecycle status
    #[serde(default)]
    pub status: PlanStatus,

    /// Mean of all phase completion percentages (0-100)
    #[serde(default)]
    pub completion: u8,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the plan was last modified (UTC)
    pub updated_at: Timestamp,

    /// Phases ordered by their order index
    #[serde(default)]
    pub phases: Vec<Phase>,

    /// Prerequisite edges between tasks of this plan
    #[serde(default)]
    pub dependencies: Vec<TaskDependency>,
}

impl Plan {
    /// Iterates over every task in the plan, phase by phase.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.phases.iter().flat_map(|phase| phase.tasks.iter())
    }

    /// Looks up a task anywhere in the plan.
    pub fn task(&self, task_id: u64) -> Option<&Task> {
        self.tasks().find(|task| task.id == task_id)
    }

    /// Prerequisite IDs of the given task, sorted ascending.
    pub fn prerequisites_of(&self, task_id: u64) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .dependencies
            .iter()
            .filter(|edge| edge.dependent_task_id == task_id)
            .map(|edge| edge.prerequisite_task_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
