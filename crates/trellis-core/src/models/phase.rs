//! Phase model definition.

use serde::{Deserialize, Serialize};

use super::Task;

/// An ordered grouping of tasks within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    /// Unique identifier for the phase
    pub id: u64,

    /// ID of the owning plan
    pub plan_id: u64,

    /// Display name of the phase
    pub name: String,

    /// Sequence position; not required to be contiguous
    pub order: u32,

    /// Share of completed tasks in this phase (0-100)
    #[serde(default)]
    pub completion: u8,

    /// Tasks ordered by their order index
    #[serde(default)]
    pub tasks: Vec<Task>,
}
