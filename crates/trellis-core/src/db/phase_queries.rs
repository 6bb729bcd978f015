//! Phase operations and queries.

use std::collections::HashMap;

use jiff::Timestamp;
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::utils::{id_column, percent_column};
use crate::{
    error::{DatabaseResultExt, PlannerError, Result},
    models::{Phase, Task},
    params::{CreatePhase, require_text},
};

const SELECT_PHASE_PLAN_SQL: &str = "SELECT plan_id FROM phases WHERE id = ?1";
const SELECT_PHASE_SQL: &str =
    "SELECT id, plan_id, name, phase_order, completion_percent FROM phases WHERE id = ?1";
const SELECT_PHASES_BY_PLAN_SQL: &str = "SELECT id, plan_id, name, phase_order, completion_percent FROM phases WHERE plan_id = ?1 ORDER BY phase_order, id";
const NEXT_PHASE_ORDER_SQL: &str =
    "SELECT COALESCE(MAX(phase_order), -1) + 1 FROM phases WHERE plan_id = ?1";
pub(super) const INSERT_PHASE_SQL: &str =
    "INSERT INTO phases (plan_id, name, phase_order) VALUES (?1, ?2, ?3)";
const DELETE_PHASE_EDGES_SQL: &str = "DELETE FROM task_dependencies WHERE prerequisite_task_id IN (SELECT id FROM tasks WHERE phase_id = ?1) OR dependent_task_id IN (SELECT id FROM tasks WHERE phase_id = ?1)";
const DELETE_PHASE_TASKS_SQL: &str = "DELETE FROM tasks WHERE phase_id = ?1";
const DELETE_PHASE_SQL: &str = "DELETE FROM phases WHERE id = ?1";

impl super::Database {
    fn build_phase_from_row(row: &Row) -> rusqlite::Result<Phase> {
        Ok(Phase {
            id: id_column(row, 0)?,
            plan_id: id_column(row, 1)?,
            name: row.get(2)?,
            order: row.get::<_, i64>(3)? as u32,
            completion: percent_column(row, 4)?,
            tasks: Vec::new(),
        })
    }

    /// Owning plan of a phase, or `None` when the phase does not exist.
    pub(super) fn phase_plan_id(conn: &Connection, phase_id: u64) -> Result<Option<u64>> {
        conn.query_row(SELECT_PHASE_PLAN_SQL, params![phase_id as i64], |row| {
            id_column(row, 0)
        })
        .optional()
        .db_context("Failed to query phase")
    }

    /// Loads a plan's phases in order, each with its tasks.
    pub(super) fn phases_of_plan(conn: &Connection, plan_id: u64) -> Result<Vec<Phase>> {
        let mut stmt = conn
            .prepare(SELECT_PHASES_BY_PLAN_SQL)
            .db_context("Failed to prepare query")?;
        let mut phases = stmt
            .query_map(params![plan_id as i64], Self::build_phase_from_row)
            .db_context("Failed to query phases")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch phases")?;

        let mut tasks_by_phase: HashMap<u64, Vec<Task>> = HashMap::new();
        for task in Self::tasks_of_plan(conn, plan_id)? {
            tasks_by_phase.entry(task.phase_id).or_default().push(task);
        }
        for phase in &mut phases {
            phase.tasks = tasks_by_phase.remove(&phase.id).unwrap_or_default();
        }
        Ok(phases)
    }

    fn phase_by_id(conn: &Connection, phase_id: u64) -> Result<Option<Phase>> {
        let phase = conn
            .query_row(
                SELECT_PHASE_SQL,
                params![phase_id as i64],
                Self::build_phase_from_row,
            )
            .optional()
            .db_context("Failed to query phase")?;

        match phase {
            Some(mut phase) => {
                phase.tasks = Self::tasks_of_phase(conn, phase_id)?;
                Ok(Some(phase))
            }
            None => Ok(None),
        }
    }

    /// Retrieves a phase with its tasks.
    pub fn get_phase(&self, phase_id: u64) -> Result<Option<Phase>> {
        Self::phase_by_id(&self.connection, phase_id)
    }

    /// Appends a phase to a plan.
    ///
    /// Without an explicit order the phase goes after the last one. An empty
    /// phase counts as 0% complete, so the plan's overall completion is
    /// recomputed.
    pub fn create_phase(&mut self, new_phase: &CreatePhase) -> Result<Phase> {
        require_text("name", &new_phase.name)?;

        let tx = self.write_transaction()?;
        if !Self::plan_exists(&tx, new_phase.plan_id)? {
            return Err(PlannerError::PlanNotFound {
                id: new_phase.plan_id,
            });
        }

        let order: i64 = match new_phase.order {
            Some(order) => i64::from(order),
            None => tx
                .query_row(
                    NEXT_PHASE_ORDER_SQL,
                    params![new_phase.plan_id as i64],
                    |row| row.get(0),
                )
                .db_context("Failed to get next phase order")?,
        };

        tx.execute(
            INSERT_PHASE_SQL,
            params![new_phase.plan_id as i64, new_phase.name, order],
        )
        .db_context("Failed to insert phase")?;
        let id = tx.last_insert_rowid() as u64;

        Self::refresh_aggregates(&tx, new_phase.plan_id)?;
        Self::touch_plan(&tx, new_phase.plan_id, &Timestamp::now().to_string())?;
        let phase = Self::phase_by_id(&tx, id)?.ok_or(PlannerError::PhaseNotFound { id })?;

        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Created phase {id} in plan {}", new_phase.plan_id);
        Ok(phase)
    }

    /// Deletes a phase, its tasks, and every edge touching those tasks.
    ///
    /// Returns the removed phase with the tasks it held.
    pub fn delete_phase(&mut self, phase_id: u64) -> Result<Phase> {
        let tx = self.write_transaction()?;
        let phase = Self::phase_by_id(&tx, phase_id)?
            .ok_or(PlannerError::PhaseNotFound { id: phase_id })?;

        tx.execute(DELETE_PHASE_EDGES_SQL, params![phase_id as i64])
            .db_context("Failed to delete phase dependencies")?;
        tx.execute(DELETE_PHASE_TASKS_SQL, params![phase_id as i64])
            .db_context("Failed to delete phase tasks")?;
        tx.execute(DELETE_PHASE_SQL, params![phase_id as i64])
            .db_context("Failed to delete phase")?;

        Self::refresh_aggregates(&tx, phase.plan_id)?;
        Self::touch_plan(&tx, phase.plan_id, &Timestamp::now().to_string())?;

        tx.commit().db_context("Failed to commit transaction")?;
        debug!(
            "Deleted phase {phase_id} with {} task(s) from plan {}",
            phase.tasks.len(),
            phase.plan_id
        );
        Ok(phase)
    }
}
