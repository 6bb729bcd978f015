//! Data models for plans, phases, tasks, dependency edges, and progress.
//!
//! Display implementations for these models live in
//! [`crate::display::models`]; this module only holds data.
//!
//! ```text
//! Plan ─┬─ Phase ─── Task
//!       ├─ TaskDependency (prerequisite → dependent)
//!       └─ ProgressSnapshot (append-only)
//! ```

pub mod dependency;
pub mod phase;
pub mod plan;
pub mod progress;
pub mod requests;
pub mod status;
pub mod task;


pub use dependency::{DependencyCheck, TaskDependencies, TaskDependency};
pub use phase::Phase;
pub use plan::Plan;
pub use progress::{PlanSummary, ProgressSnapshot, UserProgressSummary};
pub use requests::UpdateTaskRequest;
pub use status::{PlanStatus, TaskStatus};
pub use task::Task;
