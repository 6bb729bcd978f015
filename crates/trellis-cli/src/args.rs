//! Command-line argument definitions using clap
//!
//! Every subcommand has its own clap `Args` struct that converts into the
//! matching core parameter type, so clap attributes never leak into
//! `trellis_core::params`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Planner
//! ```
//!
//! Arguments that need the acting user take it from the global `--user`
//! flag through an `into_params(user_id)` method instead of `From`.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use trellis_core::params::{
    AddDependency, CreatePhase, CreatePlan, CreateTask, ExportPlan, Id, ListPlans,
    PhaseTemplate, ProgressHistory, ReorderTasks, UpdatePlan, UpdateTask,
};

/// Action plan manager with prerequisite tracking and progress history
///
/// Trellis organizes an analysis' action plan into ordered phases of tasks,
/// keeps the prerequisite graph between tasks free of cycles, and records a
/// progress snapshot every time a task changes status. It runs as a
/// command-line tool or, with `serve`, as an MCP server on stdio.
#[derive(Parser)]
#[command(version, about, name = "trellis")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/trellis/trellis.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Acting user ID
    #[arg(long, global = true, env = "TRELLIS_USER_ID", default_value_t = 1)]
    pub user: u64,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Trellis CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage phases within plans
    Phase {
        #[command(subcommand)]
        command: PhaseCommands,
    },
    /// Manage tasks within phases
    #[command(alias = "t")]
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage prerequisite edges between tasks
    #[command(alias = "d")]
    Dep {
        #[command(subcommand)]
        command: DepCommands,
    },
    /// Completion figures and history
    Progress {
        #[command(subcommand)]
        command: ProgressCommands,
    },
    /// Export a plan as CSV, JSON, or Markdown
    Export(ExportArgs),
    /// Start the MCP server
    Serve,
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a plan for an analysis
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List your plans
    #[command(aliases = ["l", "ls"])]
    List(ListPlansArgs),
    /// Show a plan with its phases, tasks, and prerequisites
    #[command(alias = "s")]
    Show(IdArgs),
    /// Change a plan's title, description, or status
    #[command(alias = "u")]
    Update(UpdatePlanArgs),
    /// Delete a plan permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
}

/// Create a new plan
#[derive(ClapArgs)]
pub struct CreatePlanArgs {
    /// Analysis the plan is created for
    pub analysis_id: u64,
    /// Title of the plan
    pub title: String,
    /// Optional description providing more context about the plan
    #[arg(short, long)]
    pub description: Option<String>,
    /// Empty phases to start with, in order (repeatable)
    #[arg(short, long = "phase")]
    pub phases: Vec<String>,
}

impl CreatePlanArgs {
    pub fn into_params(self, user_id: u64) -> CreatePlan {
        CreatePlan {
            user_id,
            analysis_id: self.analysis_id,
            title: self.title,
            description: self.description,
            phases: self
                .phases
                .into_iter()
                .map(|name| PhaseTemplate {
                    name,
                    tasks: Vec::new(),
                })
                .collect(),
        }
    }
}

/// List plans
#[derive(ClapArgs)]
pub struct ListPlansArgs {
    /// Only plans with this status ('active', 'completed', 'archived')
    #[arg(short, long)]
    pub status: Option<String>,
}

impl ListPlansArgs {
    pub fn into_params(self, user_id: u64) -> ListPlans {
        ListPlans {
            user_id,
            status: self.status,
        }
    }
}

/// Any command that takes a single resource ID
#[derive(ClapArgs)]
pub struct IdArgs {
    /// ID of the resource
    pub id: u64,
}

impl From<IdArgs> for Id {
    fn from(val: IdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Update plan metadata
#[derive(ClapArgs)]
pub struct UpdatePlanArgs {
    /// ID of the plan to update
    pub id: u64,
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// New status ('active', 'completed', 'archived')
    #[arg(short, long)]
    pub status: Option<String>,
}

impl From<UpdatePlanArgs> for UpdatePlan {
    fn from(val: UpdatePlanArgs) -> Self {
        UpdatePlan {
            id: val.id,
            title: val.title,
            description: val.description,
            status: val.status,
        }
    }
}

/// Delete a plan permanently
#[derive(ClapArgs)]
pub struct DeletePlanArgs {
    /// ID of the plan to delete
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum PhaseCommands {
    /// Add a phase to a plan
    #[command(alias = "a")]
    Add(AddPhaseArgs),
    /// Show a phase with its tasks
    #[command(alias = "s")]
    Show(IdArgs),
    /// Remove a phase with its tasks
    #[command(aliases = ["rm", "d"])]
    Remove(IdArgs),
}

/// Add a phase
#[derive(ClapArgs)]
pub struct AddPhaseArgs {
    /// Plan to add the phase to
    pub plan_id: u64,
    /// Name of the phase
    pub name: String,
    /// Position among the plan's phases; defaults to last
    #[arg(short, long)]
    pub order: Option<u32>,
}

impl From<AddPhaseArgs> for CreatePhase {
    fn from(val: AddPhaseArgs) -> Self {
        CreatePhase {
            plan_id: val.plan_id,
            name: val.name,
            order: val.order,
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a custom task to a phase
    #[command(alias = "a")]
    Add(AddTaskArgs),
    /// List the tasks of a plan, or of one phase with --phase
    #[command(aliases = ["l", "ls"])]
    List(ListTasksArgs),
    /// Show a task
    #[command(alias = "s")]
    Show(IdArgs),
    /// Change a task's status or content
    #[command(alias = "u")]
    Update(UpdateTaskArgs),
    /// Delete a task and its prerequisite edges
    #[command(aliases = ["rm", "d"])]
    Remove(IdArgs),
    /// Set the order of tasks within a phase
    Reorder(ReorderTasksArgs),
}

/// Add a custom task
#[derive(ClapArgs)]
pub struct AddTaskArgs {
    /// Plan the task belongs to
    pub plan_id: u64,
    /// Phase of that plan to add the task to
    pub phase_id: u64,
    /// Title of the task
    pub title: String,
    /// Optional detailed description of what needs to be done
    #[arg(short, long)]
    pub description: Option<String>,
    /// Free-text effort estimate, e.g. "2h"
    #[arg(short, long)]
    pub estimate: Option<String>,
    /// Resource links as comma-separated list
    #[arg(short, long, value_delimiter = ',')]
    pub resources: Vec<String>,
    /// Position within the phase; defaults to last
    #[arg(short, long)]
    pub order: Option<u32>,
}

impl From<AddTaskArgs> for CreateTask {
    fn from(val: AddTaskArgs) -> Self {
        CreateTask {
            plan_id: val.plan_id,
            phase_id: val.phase_id,
            title: val.title,
            description: val.description,
            estimated_time: val.estimate,
            resources: val.resources,
            order: val.order,
        }
    }
}

/// List tasks
#[derive(ClapArgs)]
pub struct ListTasksArgs {
    /// Plan whose tasks to list
    pub plan_id: u64,
    /// Only list the tasks of this phase
    #[arg(short, long)]
    pub phase: Option<u64>,
}

/// Update a task
#[derive(ClapArgs)]
pub struct UpdateTaskArgs {
    /// ID of the task to update
    pub id: u64,
    /// New status ('not_started', 'in_progress', 'completed', 'skipped')
    #[arg(short, long)]
    pub status: Option<String>,
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
    /// New effort estimate
    #[arg(short, long)]
    pub estimate: Option<String>,
    /// Replace resource links (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub resources: Option<Vec<String>>,
    /// Complete the task even though prerequisites are still open
    #[arg(long)]
    pub force: bool,
}

impl UpdateTaskArgs {
    pub fn into_params(self, user_id: u64) -> UpdateTask {
        UpdateTask {
            id: self.id,
            user_id: Some(user_id),
            status: self.status,
            title: self.title,
            description: self.description,
            estimated_time: self.estimate,
            resources: self.resources,
            override_prerequisites: self.force,
        }
    }
}

/// Reorder the tasks of a phase
#[derive(ClapArgs)]
pub struct ReorderTasksArgs {
    /// Phase whose tasks are reordered
    pub phase_id: u64,
    /// Task IDs in their new order, comma-separated
    #[arg(value_delimiter = ',', required = true)]
    pub task_ids: Vec<u64>,
}

impl From<ReorderTasksArgs> for ReorderTasks {
    fn from(val: ReorderTasksArgs) -> Self {
        ReorderTasks {
            phase_id: val.phase_id,
            task_ids: val.task_ids,
        }
    }
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum DepCommands {
    /// Make one task wait on another
    #[command(alias = "a")]
    Add(DependencyArgs),
    /// Check whether an edge could be added without adding it
    #[command(alias = "c")]
    Check(DependencyArgs),
    /// Remove an edge by its ID
    #[command(aliases = ["rm", "d"])]
    Remove(IdArgs),
    /// Show what a task waits on and what it blocks
    #[command(alias = "s")]
    Show(IdArgs),
    /// List a task's prerequisites that are not completed yet
    #[command(alias = "b")]
    Blocking(IdArgs),
    /// List every edge of a plan
    #[command(aliases = ["l", "ls"])]
    List(IdArgs),
    /// Print a plan's task IDs in prerequisite order
    Order(IdArgs),
}

/// Name an edge by its two tasks
#[derive(ClapArgs)]
pub struct DependencyArgs {
    /// Task that waits
    pub task_id: u64,
    /// Task that must be completed first
    pub prerequisite_task_id: u64,
}

impl From<DependencyArgs> for AddDependency {
    fn from(val: DependencyArgs) -> Self {
        AddDependency {
            task_id: val.task_id,
            prerequisite_task_id: val.prerequisite_task_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Progress and export
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ProgressCommands {
    /// Show a plan's progress snapshots
    #[command(alias = "h")]
    History(HistoryArgs),
    /// Summarize your active plans
    #[command(alias = "s")]
    Summary,
    /// Recompute a plan's stored completion percentages
    Recompute(IdArgs),
}

/// Read progress history
#[derive(ClapArgs)]
pub struct HistoryArgs {
    /// Plan ID
    pub plan_id: u64,
    /// Show newest snapshots first
    #[arg(long)]
    pub newest_first: bool,
    /// Maximum number of snapshots
    #[arg(short, long)]
    pub limit: Option<u32>,
}

impl From<HistoryArgs> for ProgressHistory {
    fn from(val: HistoryArgs) -> Self {
        ProgressHistory {
            plan_id: val.plan_id,
            newest_first: val.newest_first,
            limit: val.limit,
        }
    }
}

/// Export a plan
#[derive(ClapArgs)]
pub struct ExportArgs {
    /// Plan ID
    pub plan_id: u64,
    /// Output format ('csv', 'json', or 'markdown')
    #[arg(short, long, default_value = "markdown")]
    pub format: String,
    /// Leave completed tasks out
    #[arg(long)]
    pub exclude_completed: bool,
    /// Leave skipped tasks out
    #[arg(long)]
    pub exclude_skipped: bool,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl From<&ExportArgs> for ExportPlan {
    fn from(val: &ExportArgs) -> Self {
        ExportPlan {
            plan_id: val.plan_id,
            format: val.format.clone(),
            include_completed: !val.exclude_completed,
            include_skipped: !val.exclude_skipped,
        }
    }
}
