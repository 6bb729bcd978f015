//! Plan CRUD operations and queries.

use jiff::Timestamp;
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};

use super::{
    phase_queries::INSERT_PHASE_SQL,
    utils::{id_column, parsed_column, percent_column, timestamp_column},
};
use crate::{
    error::{DatabaseResultExt, PlannerError, Result},
    models::{Plan, PlanStatus, PlanSummary, TaskStatus},
    params::{CreatePlan, require_text},
};

const INSERT_PLAN_SQL: &str = "INSERT INTO plans (user_id, analysis_id, title, description, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const INSERT_TEMPLATE_TASK_SQL: &str = "INSERT INTO tasks (phase_id, plan_id, title, description, estimated_time, resources, task_order, is_custom, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?9)";
const SELECT_PLAN_SQL: &str = "SELECT id, user_id, analysis_id, title, description, status, completion_percent, created_at, updated_at FROM plans WHERE id = ?1";
const SELECT_PLAN_ID_BY_ANALYSIS_SQL: &str =
    "SELECT id FROM plans WHERE user_id = ?1 AND analysis_id = ?2";
const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM plans WHERE id = ?1)";
const UPDATE_PLAN_SQL: &str =
    "UPDATE plans SET title = ?1, description = ?2, status = ?3, updated_at = ?4 WHERE id = ?5";
const DELETE_PLAN_SNAPSHOTS_SQL: &str = "DELETE FROM progress_snapshots WHERE plan_id = ?1";
const DELETE_PLAN_EDGES_SQL: &str = "DELETE FROM task_dependencies WHERE plan_id = ?1";
const DELETE_PLAN_TASKS_SQL: &str = "DELETE FROM tasks WHERE plan_id = ?1";
const DELETE_PLAN_PHASES_SQL: &str = "DELETE FROM phases WHERE plan_id = ?1";
const DELETE_PLAN_SQL: &str = "DELETE FROM plans WHERE id = ?1";

const PLAN_SUMMARY_SQL: &str = "SELECT p.id, p.user_id, p.analysis_id, p.title, p.description, p.status, p.completion_percent, p.created_at, p.updated_at, \
    (SELECT COUNT(*) FROM phases ph WHERE ph.plan_id = p.id), \
    (SELECT COUNT(*) FROM tasks t WHERE t.plan_id = p.id), \
    (SELECT COUNT(*) FROM tasks t WHERE t.plan_id = p.id AND t.status = 'completed') \
    FROM plans p";

impl super::Database {
    fn build_plan_from_row(row: &Row) -> rusqlite::Result<Plan> {
        Ok(Plan {
            id: id_column(row, 0)?,
            user_id: id_column(row, 1)?,
            analysis_id: id_column(row, 2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            status: parsed_column::<PlanStatus>(row, 5)?,
            completion: percent_column(row, 6)?,
            created_at: timestamp_column(row, 7)?,
            updated_at: timestamp_column(row, 8)?,
            phases: Vec::new(),
            dependencies: Vec::new(),
        })
    }

    fn build_summary_from_row(row: &Row) -> rusqlite::Result<PlanSummary> {
        Ok(PlanSummary {
            id: id_column(row, 0)?,
            user_id: id_column(row, 1)?,
            analysis_id: id_column(row, 2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            status: parsed_column::<PlanStatus>(row, 5)?,
            completion: percent_column(row, 6)?,
            created_at: timestamp_column(row, 7)?,
            updated_at: timestamp_column(row, 8)?,
            total_phases: row.get::<_, i64>(9)? as u32,
            total_tasks: row.get::<_, i64>(10)? as u32,
            completed_tasks: row.get::<_, i64>(11)? as u32,
        })
    }

    pub(super) fn plan_exists(conn: &Connection, plan_id: u64) -> Result<bool> {
        conn.query_row(CHECK_PLAN_EXISTS_SQL, params![plan_id as i64], |row| {
            row.get(0)
        })
        .db_context("Failed to check plan existence")
    }

    /// Loads a plan with its phases, tasks, and dependency edges.
    pub(super) fn plan_by_id(conn: &Connection, plan_id: u64) -> Result<Option<Plan>> {
        let plan = conn
            .query_row(
                SELECT_PLAN_SQL,
                params![plan_id as i64],
                Self::build_plan_from_row,
            )
            .optional()
            .db_context("Failed to query plan")?;

        match plan {
            Some(mut plan) => {
                plan.phases = Self::phases_of_plan(conn, plan_id)?;
                plan.dependencies = Self::dependencies_of_plan(conn, plan_id)?;
                Ok(Some(plan))
            }
            None => Ok(None),
        }
    }

    pub(super) fn require_plan(conn: &Connection, plan_id: u64) -> Result<Plan> {
        Self::plan_by_id(conn, plan_id)?.ok_or(PlannerError::PlanNotFound { id: plan_id })
    }

    /// Creates a plan for a user's analysis, seeding the optional template
    /// phases and tasks.
    ///
    /// Only one plan may exist per (user, analysis) pair.
    pub fn create_plan(&mut self, new_plan: &CreatePlan) -> Result<Plan> {
        new_plan.validate()?;

        let tx = self.write_transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                SELECT_PLAN_ID_BY_ANALYSIS_SQL,
                params![new_plan.user_id as i64, new_plan.analysis_id as i64],
                |row| row.get(0),
            )
            .optional()
            .db_context("Failed to check for an existing plan")?;
        if let Some(existing) = existing {
            return Err(PlannerError::invalid_input("analysis_id").with_reason(format!(
                "Plan {existing} already exists for analysis {}",
                new_plan.analysis_id
            )));
        }

        let now = Timestamp::now().to_string();
        tx.execute(
            INSERT_PLAN_SQL,
            params![
                new_plan.user_id as i64,
                new_plan.analysis_id as i64,
                new_plan.title,
                new_plan.description,
                PlanStatus::Active.as_str(),
                &now,
                &now
            ],
        )
        .db_context("Failed to insert plan")?;
        let plan_id = tx.last_insert_rowid();

        for (phase_order, phase) in new_plan.phases.iter().enumerate() {
            tx.execute(
                INSERT_PHASE_SQL,
                params![plan_id, phase.name, phase_order as i64],
            )
            .db_context("Failed to insert phase")?;
            let phase_id = tx.last_insert_rowid();

            for (task_order, task) in phase.tasks.iter().enumerate() {
                tx.execute(
                    INSERT_TEMPLATE_TASK_SQL,
                    params![
                        phase_id,
                        plan_id,
                        task.title,
                        task.description,
                        task.estimated_time,
                        serde_json::to_string(&task.resources)?,
                        task_order as i64,
                        TaskStatus::NotStarted.as_str(),
                        &now
                    ],
                )
                .db_context("Failed to insert task")?;
            }
        }

        let plan = Self::require_plan(&tx, plan_id as u64)?;
        tx.commit().db_context("Failed to commit transaction")?;
        debug!(
            "Created plan {plan_id} for user {} with {} phase(s)",
            new_plan.user_id,
            plan.phases.len()
        );
        Ok(plan)
    }

    /// Retrieves a plan by its ID with phases, tasks, and edges loaded.
    pub fn get_plan(&self, id: u64) -> Result<Option<Plan>> {
        Self::plan_by_id(&self.connection, id)
    }

    /// Retrieves the plan a user created for an analysis, if any.
    pub fn get_plan_by_analysis(&self, user_id: u64, analysis_id: u64) -> Result<Option<Plan>> {
        let id: Option<i64> = self
            .connection
            .query_row(
                SELECT_PLAN_ID_BY_ANALYSIS_SQL,
                params![user_id as i64, analysis_id as i64],
                |row| row.get(0),
            )
            .optional()
            .db_context("Failed to query plan by analysis")?;

        match id {
            Some(id) => Self::plan_by_id(&self.connection, id as u64),
            None => Ok(None),
        }
    }

    /// Lists a user's plans, newest first, optionally filtered by status.
    pub fn list_plans(
        &self,
        user_id: u64,
        status: Option<PlanStatus>,
    ) -> Result<Vec<PlanSummary>> {
        let mut query = format!("{PLAN_SUMMARY_SQL} WHERE p.user_id = ?");
        let mut params_vec: Vec<Box<dyn ToSql>> = vec![Box::new(user_id as i64)];

        if let Some(status) = status {
            query.push_str(" AND p.status = ?");
            params_vec.push(Box::new(status.as_str()));
        }
        query.push_str(" ORDER BY p.id DESC");

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;
        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| &**b).collect();

        let plans = stmt
            .query_map(&params_refs[..], Self::build_summary_from_row)
            .db_context("Failed to query plans")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch plans")?;
        Ok(plans)
    }

    /// Updates plan metadata. Status changes are only ever explicit.
    pub fn update_plan(
        &mut self,
        id: u64,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<PlanStatus>,
    ) -> Result<Plan> {
        if let Some(title) = title {
            require_text("title", title)?;
        }

        let tx = self.write_transaction()?;
        let current = Self::require_plan(&tx, id)?;

        tx.execute(
            UPDATE_PLAN_SQL,
            params![
                title.unwrap_or(&current.title),
                description.or(current.description.as_deref()),
                status.unwrap_or(current.status).as_str(),
                Timestamp::now().to_string(),
                id as i64
            ],
        )
        .db_context("Failed to update plan")?;

        let plan = Self::require_plan(&tx, id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Updated plan {id}");
        Ok(plan)
    }

    /// Permanently deletes a plan with its phases, tasks, edges, and
    /// progress history. Returns the plan as it was before deletion.
    pub fn delete_plan(&mut self, id: u64) -> Result<Plan> {
        let tx = self.write_transaction()?;
        let plan = Self::require_plan(&tx, id)?;

        for (sql, what) in [
            (DELETE_PLAN_SNAPSHOTS_SQL, "progress snapshots"),
            (DELETE_PLAN_EDGES_SQL, "dependencies"),
            (DELETE_PLAN_TASKS_SQL, "tasks"),
            (DELETE_PLAN_PHASES_SQL, "phases"),
            (DELETE_PLAN_SQL, "plan"),
        ] {
            tx.execute(sql, params![id as i64]).map_err(|e| {
                PlannerError::database(format!("Failed to delete {what}")).with_source(e)
            })?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Deleted plan {id}");
        Ok(plan)
    }
}
