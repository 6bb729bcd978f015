//! Command handlers for the CLI.
//!
//! Each handler converts its clap arguments into core parameters, calls the
//! planner, wraps the result in a display type, and hands the markdown to the
//! terminal renderer.

use anyhow::{Context, Result, bail};
use log::debug;
use trellis_core::{
    CreateResult, DeleteResult, Dependencies, PlanSummaries, Planner, ProgressHistory, Tasks,
    UpdateResult,
    display::OperationStatus,
    params::{Id, UpdatePlan, UpdateTask, UserProgress},
};

use crate::{
    args::{DepCommands, ExportArgs, PhaseCommands, PlanCommands, ProgressCommands, TaskCommands},
    renderer::TerminalRenderer,
};

/// CLI command dispatcher bound to one planner and acting user.
pub struct Cli {
    planner: Planner,
    renderer: TerminalRenderer,
    user_id: u64,
}

impl Cli {
    pub fn new(planner: Planner, renderer: TerminalRenderer, user_id: u64) -> Self {
        Self {
            planner,
            renderer,
            user_id,
        }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => {
                let plan = self
                    .planner
                    .create_plan(&args.into_params(self.user_id))
                    .await
                    .context("Failed to create plan")?;
                self.renderer.render(&CreateResult::new(plan).to_string())
            }
            PlanCommands::List(args) => {
                let plans = self
                    .planner
                    .list_plans(&args.into_params(self.user_id))
                    .await
                    .context("Failed to list plans")?;
                self.renderer.render(&PlanSummaries(plans).to_string())
            }
            PlanCommands::Show(args) => {
                let plan = self
                    .planner
                    .show_plan(&args.into())
                    .await
                    .context("Failed to show plan")?;
                self.renderer.render(&plan.to_string())
            }
            PlanCommands::Update(args) => {
                let params: UpdatePlan = args.into();
                let changes = plan_changes(&params);
                let plan = self
                    .planner
                    .update_plan(&params)
                    .await
                    .context("Failed to update plan")?;
                self.renderer
                    .render(&UpdateResult::with_changes(plan, changes).to_string())
            }
            PlanCommands::Delete(args) => {
                if !args.confirm {
                    bail!(
                        "Refusing to delete plan {} without --confirm; this cannot be undone",
                        args.id
                    );
                }
                let plan = self
                    .planner
                    .delete_plan(&Id { id: args.id })
                    .await
                    .context("Failed to delete plan")?;
                self.renderer.render(&DeleteResult::new(plan).to_string())
            }
        }
    }

    pub async fn handle_phase_command(&self, command: PhaseCommands) -> Result<()> {
        match command {
            PhaseCommands::Add(args) => {
                let phase = self
                    .planner
                    .create_phase(&args.into())
                    .await
                    .context("Failed to add phase")?;
                self.renderer.render(&CreateResult::new(phase).to_string())
            }
            PhaseCommands::Show(args) => {
                let phase = self
                    .planner
                    .show_phase(&args.into())
                    .await
                    .context("Failed to show phase")?;
                let mut output = phase.to_string();
                output.push_str(&Tasks(phase.tasks).to_string());
                self.renderer.render(&output)
            }
            PhaseCommands::Remove(args) => {
                let phase = self
                    .planner
                    .delete_phase(&args.into())
                    .await
                    .context("Failed to remove phase")?;
                self.renderer.render(&DeleteResult::new(phase).to_string())
            }
        }
    }

    pub async fn handle_task_command(&self, command: TaskCommands) -> Result<()> {
        match command {
            TaskCommands::Add(args) => {
                let task = self
                    .planner
                    .create_task(&args.into())
                    .await
                    .context("Failed to add task")?;
                self.renderer.render(&CreateResult::new(task).to_string())
            }
            TaskCommands::List(args) => {
                let tasks = match args.phase {
                    Some(phase_id) => self.planner.list_phase_tasks(&Id { id: phase_id }).await,
                    None => self.planner.list_tasks(&Id { id: args.plan_id }).await,
                }
                .context("Failed to list tasks")?;
                self.renderer.render(&Tasks(tasks).to_string())
            }
            TaskCommands::Show(args) => {
                let task = self
                    .planner
                    .show_task(&args.into())
                    .await
                    .context("Failed to show task")?;
                self.renderer.render(&task.to_string())
            }
            TaskCommands::Update(args) => {
                let params = args.into_params(self.user_id);
                let changes = task_changes(&params);
                debug!("Updating task {}: {changes:?}", params.id);
                let task = self
                    .planner
                    .update_task(&params)
                    .await
                    .context("Failed to update task")?;
                self.renderer
                    .render(&UpdateResult::with_changes(task, changes).to_string())
            }
            TaskCommands::Remove(args) => {
                let task = self
                    .planner
                    .delete_task(&args.into())
                    .await
                    .context("Failed to remove task")?;
                self.renderer.render(&DeleteResult::new(task).to_string())
            }
            TaskCommands::Reorder(args) => {
                let tasks = self
                    .planner
                    .reorder_tasks(&args.into())
                    .await
                    .context("Failed to reorder tasks")?;
                self.renderer.render(&Tasks(tasks).to_string())
            }
        }
    }

    pub async fn handle_dep_command(&self, command: DepCommands) -> Result<()> {
        match command {
            DepCommands::Add(args) => {
                let edge = self
                    .planner
                    .add_dependency(&args.into())
                    .await
                    .context("Failed to add dependency")?;
                self.renderer.render(&CreateResult::new(edge).to_string())
            }
            DepCommands::Check(args) => {
                let check = self
                    .planner
                    .validate_dependency(&args.into())
                    .await
                    .context("Failed to check dependency")?;
                self.renderer.render(&check.to_string())
            }
            DepCommands::Remove(args) => {
                let edge = self
                    .planner
                    .remove_dependency(&args.into())
                    .await
                    .context("Failed to remove dependency")?;
                self.renderer.render(&DeleteResult::new(edge).to_string())
            }
            DepCommands::Show(args) => {
                let deps = self
                    .planner
                    .get_dependencies(&args.into())
                    .await
                    .context("Failed to read dependencies")?;
                self.renderer.render(&deps.to_string())
            }
            DepCommands::Blocking(args) => {
                let tasks = self
                    .planner
                    .get_incomplete_prerequisites(&args.into())
                    .await
                    .context("Failed to read prerequisites")?;
                if tasks.is_empty() {
                    let status = OperationStatus::success("No incomplete prerequisites");
                    return self.renderer.render(&status.to_string());
                }
                self.renderer.render(&Tasks(tasks).to_string())
            }
            DepCommands::List(args) => {
                let edges = self
                    .planner
                    .list_plan_dependencies(&args.into())
                    .await
                    .context("Failed to list dependencies")?;
                self.renderer.render(&Dependencies(edges).to_string())
            }
            DepCommands::Order(args) => {
                let order = self
                    .planner
                    .topological_order(&args.into())
                    .await
                    .context("Failed to order tasks")?;
                let lines: Vec<String> = order
                    .iter()
                    .enumerate()
                    .map(|(i, id)| format!("{}. task {id}", i + 1))
                    .collect();
                self.renderer.render(&format!("{}\n", lines.join("\n")))
            }
        }
    }

    pub async fn handle_progress_command(&self, command: ProgressCommands) -> Result<()> {
        match command {
            ProgressCommands::History(args) => {
                let history = self
                    .planner
                    .progress_history(&args.into())
                    .await
                    .context("Failed to read progress history")?;
                self.renderer.render(&ProgressHistory(history).to_string())
            }
            ProgressCommands::Summary => self.show_summary().await,
            ProgressCommands::Recompute(args) => {
                let completion = self
                    .planner
                    .recompute_overall_completion(&args.into())
                    .await
                    .context("Failed to recompute completion")?;
                let status = OperationStatus::success(format!("Plan is {completion}% complete"));
                self.renderer.render(&status.to_string())
            }
        }
    }

    pub async fn handle_export(&self, args: ExportArgs) -> Result<()> {
        let output = self
            .planner
            .export_plan(&(&args).into())
            .await
            .context("Failed to export plan")?;

        match args.output {
            Some(path) => {
                std::fs::write(&path, output)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                let status = OperationStatus::success(format!(
                    "Exported plan {} to {}",
                    args.plan_id,
                    path.display()
                ));
                self.renderer.render(&status.to_string())
            }
            None => {
                // Exports are data, never styled
                print!("{output}");
                Ok(())
            }
        }
    }

    /// Dashboard shown when no subcommand is given.
    pub async fn show_summary(&self) -> Result<()> {
        let summary = self
            .planner
            .user_progress_summary(&UserProgress {
                user_id: self.user_id,
            })
            .await
            .context("Failed to summarize progress")?;
        self.renderer.render(&summary.to_string())
    }
}

fn plan_changes(params: &UpdatePlan) -> Vec<String> {
    let mut changes = Vec::new();
    if let Some(title) = &params.title {
        changes.push(format!("Title: {title}"));
    }
    if params.description.is_some() {
        changes.push("Description updated".to_string());
    }
    if let Some(status) = &params.status {
        changes.push(format!("Status: {status}"));
    }
    changes
}

fn task_changes(params: &UpdateTask) -> Vec<String> {
    let mut changes = Vec::new();
    if let Some(status) = &params.status {
        changes.push(format!("Status: {status}"));
    }
    if let Some(title) = &params.title {
        changes.push(format!("Title: {title}"));
    }
    if params.description.is_some() {
        changes.push("Description updated".to_string());
    }
    if let Some(estimate) = &params.estimated_time {
        changes.push(format!("Estimate: {estimate}"));
    }
    if params.resources.is_some() {
        changes.push("Resources replaced".to_string());
    }
    if params.override_prerequisites {
        changes.push("Prerequisite check overridden".to_string());
    }
    changes
}
