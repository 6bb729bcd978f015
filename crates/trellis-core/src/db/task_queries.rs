//! Task CRUD operations and queries.

use std::collections::HashSet;

use jiff::Timestamp;
use log::{debug, warn};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::utils::{
    id_column, json_column, optional_id_column, optional_timestamp_column, parsed_column,
    timestamp_column,
};
use crate::{
    error::{DatabaseResultExt, PlannerError, Result},
    models::{Task, TaskStatus, UpdateTaskRequest},
    params::{CreateTask, require_text},
};

const INSERT_TASK_SQL: &str = "INSERT INTO tasks (phase_id, plan_id, title, description, estimated_time, resources, task_order, is_custom, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
const NEXT_TASK_ORDER_SQL: &str =
    "SELECT COALESCE(MAX(task_order), -1) + 1 FROM tasks WHERE phase_id = ?1";
const SELECT_TASK_BY_ID_SQL: &str = "SELECT id, phase_id, plan_id, title, description, estimated_time, resources, task_order, is_custom, status, completed_at, completed_by, created_at, updated_at FROM tasks WHERE id = ?1";
const SELECT_TASKS_BY_PHASE_SQL: &str = "SELECT id, phase_id, plan_id, title, description, estimated_time, resources, task_order, is_custom, status, completed_at, completed_by, created_at, updated_at FROM tasks WHERE phase_id = ?1 ORDER BY task_order, id";
const SELECT_TASKS_BY_PLAN_SQL: &str = "SELECT t.id, t.phase_id, t.plan_id, t.title, t.description, t.estimated_time, t.resources, t.task_order, t.is_custom, t.status, t.completed_at, t.completed_by, t.created_at, t.updated_at FROM tasks t JOIN phases p ON p.id = t.phase_id WHERE t.plan_id = ?1 ORDER BY p.phase_order, p.id, t.task_order, t.id";
const UPDATE_TASK_SQL: &str = "UPDATE tasks SET title = ?1, description = ?2, estimated_time = ?3, resources = ?4, status = ?5, completed_at = ?6, completed_by = ?7, updated_at = ?8 WHERE id = ?9";
const UPDATE_TASK_ORDER_SQL: &str =
    "UPDATE tasks SET task_order = ?1, updated_at = ?2 WHERE id = ?3 AND phase_id = ?4";
const DELETE_TASK_EDGES_SQL: &str =
    "DELETE FROM task_dependencies WHERE prerequisite_task_id = ?1 OR dependent_task_id = ?1";
const DELETE_TASK_SQL: &str = "DELETE FROM tasks WHERE id = ?1";
const UPDATE_PLAN_TIMESTAMP_SQL: &str = "UPDATE plans SET updated_at = ?1 WHERE id = ?2";

impl super::Database {
    /// Helper function to construct a Task from a database row
    pub(super) fn build_task_from_row(row: &Row) -> rusqlite::Result<Task> {
        Ok(Task {
            id: id_column(row, 0)?,
            phase_id: id_column(row, 1)?,
            plan_id: id_column(row, 2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            estimated_time: row.get(5)?,
            resources: json_column(row, 6)?,
            order: row.get::<_, i64>(7)? as u32,
            is_custom: row.get(8)?,
            status: parsed_column::<TaskStatus>(row, 9)?,
            completed_at: optional_timestamp_column(row, 10)?,
            completed_by: optional_id_column(row, 11)?,
            created_at: timestamp_column(row, 12)?,
            updated_at: timestamp_column(row, 13)?,
        })
    }

    pub(super) fn task_by_id(conn: &Connection, id: u64) -> Result<Option<Task>> {
        conn.query_row(SELECT_TASK_BY_ID_SQL, params![id as i64], Self::build_task_from_row)
            .optional()
            .db_context("Failed to query task")
    }

    pub(super) fn require_task(conn: &Connection, id: u64) -> Result<Task> {
        Self::task_by_id(conn, id)?.ok_or(PlannerError::TaskNotFound { id })
    }

    pub(super) fn tasks_of_phase(conn: &Connection, phase_id: u64) -> Result<Vec<Task>> {
        let mut stmt = conn
            .prepare(SELECT_TASKS_BY_PHASE_SQL)
            .db_context("Failed to prepare query")?;
        let tasks = stmt
            .query_map(params![phase_id as i64], Self::build_task_from_row)
            .db_context("Failed to query tasks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch tasks")?;
        Ok(tasks)
    }

    pub(super) fn tasks_of_plan(conn: &Connection, plan_id: u64) -> Result<Vec<Task>> {
        let mut stmt = conn
            .prepare(SELECT_TASKS_BY_PLAN_SQL)
            .db_context("Failed to prepare query")?;
        let tasks = stmt
            .query_map(params![plan_id as i64], Self::build_task_from_row)
            .db_context("Failed to query tasks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch tasks")?;
        Ok(tasks)
    }

    pub(super) fn touch_plan(conn: &Connection, plan_id: u64, now: &str) -> Result<()> {
        conn.execute(UPDATE_PLAN_TIMESTAMP_SQL, params![now, plan_id as i64])
            .db_context("Failed to update plan timestamp")?;
        Ok(())
    }

    /// Adds a custom task to a phase of the given plan.
    ///
    /// The task starts as `not_started`. Without an explicit order it is
    /// placed after the last task of the phase.
    pub fn create_task(&mut self, new_task: &CreateTask) -> Result<Task> {
        require_text("title", &new_task.title)?;
        let resources = serde_json::to_string(&new_task.resources)?;

        let tx = self.write_transaction()?;

        if !Self::plan_exists(&tx, new_task.plan_id)? {
            return Err(PlannerError::PlanNotFound {
                id: new_task.plan_id,
            });
        }
        if Self::phase_plan_id(&tx, new_task.phase_id)? != Some(new_task.plan_id) {
            return Err(PlannerError::PhaseNotFound {
                id: new_task.phase_id,
            });
        }

        let order: i64 = match new_task.order {
            Some(order) => i64::from(order),
            None => tx
                .query_row(
                    NEXT_TASK_ORDER_SQL,
                    params![new_task.phase_id as i64],
                    |row| row.get(0),
                )
                .db_context("Failed to get next task order")?,
        };

        let now = Timestamp::now().to_string();
        tx.execute(
            INSERT_TASK_SQL,
            params![
                new_task.phase_id as i64,
                new_task.plan_id as i64,
                new_task.title,
                new_task.description,
                new_task.estimated_time,
                resources,
                order,
                true,
                TaskStatus::NotStarted.as_str(),
                &now,
                &now
            ],
        )
        .db_context("Failed to insert task")?;
        let id = tx.last_insert_rowid() as u64;

        Self::refresh_aggregates(&tx, new_task.plan_id)?;
        Self::touch_plan(&tx, new_task.plan_id, &now)?;
        let task = Self::require_task(&tx, id)?;

        tx.commit().db_context("Failed to commit transaction")?;
        debug!(
            "Created task {id} in phase {} of plan {}",
            new_task.phase_id, new_task.plan_id
        );
        Ok(task)
    }

    /// Retrieves a task by its ID.
    pub fn get_task(&self, id: u64) -> Result<Option<Task>> {
        Self::task_by_id(&self.connection, id)
    }

    /// Lists a plan's tasks ordered by phase order, then task order.
    pub fn list_tasks(&self, plan_id: u64) -> Result<Vec<Task>> {
        if !Self::plan_exists(&self.connection, plan_id)? {
            return Err(PlannerError::PlanNotFound { id: plan_id });
        }
        Self::tasks_of_plan(&self.connection, plan_id)
    }

    /// Lists a phase's tasks ordered by their order index.
    pub fn list_phase_tasks(&self, phase_id: u64) -> Result<Vec<Task>> {
        if Self::phase_plan_id(&self.connection, phase_id)?.is_none() {
            return Err(PlannerError::PhaseNotFound { id: phase_id });
        }
        Self::tasks_of_phase(&self.connection, phase_id)
    }

    /// Updates a task's fields and status.
    ///
    /// A transition into `completed` is refused while any prerequisite is not
    /// completed, unless the request sets `override_prerequisites`. The
    /// transition stamps `completed_at`/`completed_by`; leaving `completed`
    /// clears both. Any status change recomputes the plan's completion and
    /// appends a progress snapshot in the same transaction.
    pub fn update_task(&mut self, id: u64, request: &UpdateTaskRequest) -> Result<Task> {
        if let Some(title) = &request.title {
            require_text("title", title)?;
        }

        let tx = self.write_transaction()?;
        let current = Self::require_task(&tx, id)?;

        let new_status = request.status.unwrap_or(current.status);
        let completing = new_status.is_completed() && !current.status.is_completed();

        if completing {
            let blocking: Vec<u64> = Self::incomplete_prerequisites(&tx, id)?
                .iter()
                .map(|task| task.id)
                .collect();
            if !blocking.is_empty() {
                if !request.override_prerequisites {
                    return Err(PlannerError::IncompletePrerequisites {
                        task_id: id,
                        prerequisite_ids: blocking,
                    });
                }
                warn!("Completing task {id} despite incomplete prerequisites {blocking:?}");
            }
        }

        let now = Timestamp::now();
        let now_str = now.to_string();
        let (completed_at, completed_by) = if completing {
            (Some(now), request.acting_user_id)
        } else if new_status.is_completed() {
            (current.completed_at, current.completed_by)
        } else {
            (None, None)
        };

        let resources =
            serde_json::to_string(request.resources.as_ref().unwrap_or(&current.resources))?;

        tx.execute(
            UPDATE_TASK_SQL,
            params![
                request.title.as_deref().unwrap_or(&current.title),
                request
                    .description
                    .as_deref()
                    .or(current.description.as_deref()),
                request
                    .estimated_time
                    .as_deref()
                    .or(current.estimated_time.as_deref()),
                resources,
                new_status.as_str(),
                completed_at.map(|at| at.to_string()),
                completed_by.map(|user| user as i64),
                &now_str,
                id as i64
            ],
        )
        .db_context("Failed to update task")?;
        Self::touch_plan(&tx, current.plan_id, &now_str)?;

        if new_status != current.status {
            let snapshot = Self::record_status_change(&tx, current.plan_id, id)?;
            debug!(
                "Task {id} moved from {} to {}; plan {} now {}% complete",
                current.status.as_str(),
                new_status.as_str(),
                current.plan_id,
                snapshot.overall_completion
            );
        }

        let task = Self::require_task(&tx, id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(task)
    }

    /// Deletes a task together with every dependency edge touching it.
    ///
    /// Returns the removed task.
    pub fn delete_task(&mut self, id: u64) -> Result<Task> {
        let tx = self.write_transaction()?;
        let task = Self::require_task(&tx, id)?;

        let edges = tx
            .execute(DELETE_TASK_EDGES_SQL, params![id as i64])
            .db_context("Failed to delete task dependencies")?;
        tx.execute(DELETE_TASK_SQL, params![id as i64])
            .db_context("Failed to delete task")?;

        Self::refresh_aggregates(&tx, task.plan_id)?;
        Self::touch_plan(&tx, task.plan_id, &Timestamp::now().to_string())?;

        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Deleted task {id} and {edges} dependency edge(s)");
        Ok(task)
    }

    /// Assigns order indices `0..n` to the given tasks in the order supplied.
    ///
    /// Every ID must belong to the phase and appear once. Tasks of the phase
    /// that are not listed keep their current order.
    pub fn reorder_tasks(&mut self, phase_id: u64, task_ids: &[u64]) -> Result<Vec<Task>> {
        let mut seen = HashSet::with_capacity(task_ids.len());
        if let Some(duplicate) = task_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(PlannerError::invalid_input("task_ids")
                .with_reason(format!("Task {duplicate} is listed more than once")));
        }

        let tx = self.write_transaction()?;
        let plan_id = Self::phase_plan_id(&tx, phase_id)?
            .ok_or(PlannerError::PhaseNotFound { id: phase_id })?;

        let now = Timestamp::now().to_string();
        for (position, task_id) in task_ids.iter().enumerate() {
            let updated = tx
                .execute(
                    UPDATE_TASK_ORDER_SQL,
                    params![position as i64, &now, *task_id as i64, phase_id as i64],
                )
                .db_context("Failed to update task order")?;
            if updated == 0 {
                return Err(PlannerError::invalid_input("task_ids").with_reason(format!(
                    "Task {task_id} does not belong to phase {phase_id}"
                )));
            }
        }

        if !task_ids.is_empty() {
            Self::touch_plan(&tx, plan_id, &now)?;
        }
        let tasks = Self::tasks_of_phase(&tx, phase_id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Reordered {} task(s) in phase {phase_id}", task_ids.len());
        Ok(tasks)
    }
}
