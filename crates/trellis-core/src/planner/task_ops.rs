//! Task operations for the Planner.

use super::Planner;
use crate::{
    error::{PlannerError, Result},
    models::{Task, UpdateTaskRequest},
    params::{CreateTask, Id, ReorderTasks, UpdateTask, require_text},
};

impl Planner {
    /// Creates a custom task in a phase of a plan.
    pub async fn create_task(&self, params: &CreateTask) -> Result<Task> {
        require_text("title", &params.title)?;
        let params = params.clone();

        self.with_db(move |db| db.create_task(&params)).await
    }

    /// Retrieves a task by its ID.
    pub async fn get_task(&self, params: &Id) -> Result<Option<Task>> {
        let task_id = params.id;
        self.with_db(move |db| db.get_task(task_id)).await
    }

    /// Retrieves a task by ID, treating absence as an error.
    pub async fn show_task(&self, params: &Id) -> Result<Task> {
        let task_id = params.id;
        self.get_task(params)
            .await?
            .ok_or(PlannerError::TaskNotFound { id: task_id })
    }

    /// All tasks of a plan, in phase order then task order.
    pub async fn list_tasks(&self, params: &Id) -> Result<Vec<Task>> {
        let plan_id = params.id;
        self.with_db(move |db| db.list_tasks(plan_id)).await
    }

    /// Tasks of one phase, in task order.
    pub async fn list_phase_tasks(&self, params: &Id) -> Result<Vec<Task>> {
        let phase_id = params.id;
        self.with_db(move |db| db.list_phase_tasks(phase_id)).await
    }

    /// Updates task content or status.
    ///
    /// A status change refreshes the plan's completion figures and appends a
    /// progress snapshot in the same transaction.
    pub async fn update_task(&self, params: &UpdateTask) -> Result<Task> {
        let task_id = params.id;
        let request = UpdateTaskRequest::try_from(params.clone())?;

        self.with_db(move |db| db.update_task(task_id, &request)).await
    }

    /// Deletes a task and every edge touching it.
    pub async fn delete_task(&self, params: &Id) -> Result<Task> {
        let task_id = params.id;
        self.with_db(move |db| db.delete_task(task_id)).await
    }

    /// Assigns consecutive orders to the listed tasks of a phase.
    pub async fn reorder_tasks(&self, params: &ReorderTasks) -> Result<Vec<Task>> {
        let phase_id = params.phase_id;
        let task_ids = params.task_ids.clone();

        self.with_db(move |db| db.reorder_tasks(phase_id, &task_ids)).await
    }
}
