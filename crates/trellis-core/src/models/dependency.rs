//! Dependency edge model definitions.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A directed prerequisite edge: the dependent task is blocked until the
/// prerequisite task is completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskDependency {
    /// Unique identifier for the edge
    pub id: u64,

    /// Plan that both endpoint tasks belong to
    pub plan_id: u64,

    /// Task that must be completed first
    pub prerequisite_task_id: u64,

    /// Task that waits on the prerequisite
    pub dependent_task_id: u64,

    /// Timestamp when the edge was created (UTC)
    pub created_at: Timestamp,
}

/// Both directions of a task's dependency neighbourhood.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaskDependencies {
    /// The task the neighbourhood was read for
    pub task_id: u64,

    /// Tasks this task waits on
    pub prerequisites: Vec<u64>,

    /// Tasks waiting on this task
    pub dependents: Vec<u64>,
}

/// Outcome of a dependency pre-flight check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyCheck {
    /// Proposed prerequisite
    pub prerequisite_task_id: u64,

    /// Proposed dependent
    pub dependent_task_id: u64,

    /// Whether the edge could be added right now
    pub valid: bool,

    /// Why the edge would be rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
