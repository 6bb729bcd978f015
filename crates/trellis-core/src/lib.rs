//! Core library for Trellis, an action-plan dependency graph and progress
//! engine.
//!
//! A plan belongs to one user's analysis and is split into ordered phases of
//! ordered tasks. Tasks can name other tasks of the same plan as
//! prerequisites; the resulting graph is kept acyclic at all times, and
//! completing a task whose prerequisites are still open is refused unless the
//! caller explicitly overrides the gate. Every task status change refreshes
//! the stored phase and plan percentages and appends a progress snapshot.
//!
//! # Layers
//!
//! - **Store** ([`db`]): SQLite persistence; every mutation is one
//!   transaction
//! - **Graph** ([`graph`]): pure reachability and ordering over edges
//! - **Progress** ([`progress`]): pure completion arithmetic
//! - **Facade** ([`planner`]): async API used by the CLI and the MCP server
//! - **Output** ([`display`], [`export`]): markdown views and file exports
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use trellis_core::{
//!     PlannerBuilder,
//!     params::{AddDependency, CreatePlan, PhaseTemplate, TaskTemplate, UpdateTask},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("trellis.db"))
//!     .build()
//!     .await?;
//!
//! let plan = planner
//!     .create_plan(&CreatePlan {
//!         user_id: 1,
//!         analysis_id: 7,
//!         title: "Open a bakery".to_string(),
//!         phases: vec![PhaseTemplate {
//!             name: "Groundwork".to_string(),
//!             tasks: vec![
//!                 TaskTemplate { title: "Find a location".to_string(), ..Default::default() },
//!                 TaskTemplate { title: "Sign the lease".to_string(), ..Default::default() },
//!             ],
//!         }],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let tasks: Vec<u64> = plan.tasks().map(|t| t.id).collect();
//! planner
//!     .add_dependency(&AddDependency { task_id: tasks[1], prerequisite_task_id: tasks[0] })
//!     .await?;
//!
//! planner
//!     .update_task(&UpdateTask {
//!         id: tasks[0],
//!         status: Some("completed".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod display;
pub mod error;
pub mod export;
pub mod graph;
pub mod models;
pub mod params;
pub mod planner;
pub mod progress;

// Re-export commonly used types
pub use db::Database;
pub use display::{
    CreateResult, DeleteResult, Dependencies, LocalDateTime, OperationStatus, PlanSummaries,
    ProgressBar, ProgressHistory, Tasks, UpdateResult,
};
pub use error::{ErrorKind, PlannerError, Result};
pub use export::{ExportFormat, ExportOptions};
pub use graph::DependencyGraph;
pub use models::{
    DependencyCheck, Phase, Plan, PlanStatus, PlanSummary, ProgressSnapshot, Task,
    TaskDependencies, TaskDependency, TaskStatus, UpdateTaskRequest, UserProgressSummary,
};
pub use params::{
    AddDependency, CreatePhase, CreatePlan, CreateTask, ExportPlan, Id, ListPlans,
    PlanByAnalysis, ReorderTasks, UpdatePlan, UpdateTask, UserProgress,
};
pub use planner::{Planner, PlannerBuilder};
