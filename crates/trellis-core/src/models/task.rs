//! Task model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::TaskStatus;

/// An actionable unit of work inside exactly one phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task
    pub id: u64,

    /// ID of the owning phase
    pub phase_id: u64,

    /// ID of the plan the phase belongs to
    pub plan_id: u64,

    /// Brief title/summary of the task
    pub title: String,

    /// Detailed multi-line description of the task
    pub description: Option<String>,

    /// Free-text effort estimate, e.g. "2-3 hours"
    pub estimated_time: Option<String>,

    /// Links to relevant resources, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,

    /// Order of the task within its phase
    pub order: u32,

    /// True for user-added tasks, false for template-seeded ones
    pub is_custom: bool,

    /// Current status of the task
    pub status: TaskStatus,

    /// When the task was last marked completed
    pub completed_at: Option<Timestamp>,

    /// User who marked the task completed
    pub completed_by: Option<u64>,

    /// Timestamp when the task was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp when the task was last updated (UTC)
    pub updated_at: Timestamp,
}
