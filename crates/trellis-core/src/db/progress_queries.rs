//! Completion aggregates and the append-only progress history.

use std::collections::BTreeMap;

use jiff::Timestamp;
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::utils::{id_column, json_column, optional_id_column, percent_column, timestamp_column};
use crate::{
    error::{DatabaseResultExt, PlannerError, Result},
    models::{PlanStatus, ProgressSnapshot, UserProgressSummary},
    progress,
};

const SELECT_PHASE_COUNTS_SQL: &str = "SELECT ph.id, COUNT(t.id), COALESCE(SUM(CASE WHEN t.status = 'completed' THEN 1 ELSE 0 END), 0) FROM phases ph LEFT JOIN tasks t ON t.phase_id = ph.id WHERE ph.plan_id = ?1 GROUP BY ph.id ORDER BY ph.phase_order, ph.id";
const SELECT_SINGLE_PHASE_COUNTS_SQL: &str = "SELECT COUNT(*), COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) FROM tasks WHERE phase_id = ?1";
const UPDATE_PHASE_COMPLETION_SQL: &str = "UPDATE phases SET completion_percent = ?1 WHERE id = ?2";
const UPDATE_PLAN_COMPLETION_SQL: &str = "UPDATE plans SET completion_percent = ?1 WHERE id = ?2";
const SELECT_COMPLETED_TASK_IDS_SQL: &str =
    "SELECT id FROM tasks WHERE plan_id = ?1 AND status = 'completed' ORDER BY id";
const SELECT_LAST_SNAPSHOT_TIME_SQL: &str =
    "SELECT created_at FROM progress_snapshots WHERE plan_id = ?1 ORDER BY id DESC LIMIT 1";
const INSERT_SNAPSHOT_SQL: &str = "INSERT INTO progress_snapshots (plan_id, task_id, completed_task_ids, phase_completion, overall_completion, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_SNAPSHOTS_SQL: &str = "SELECT id, plan_id, task_id, completed_task_ids, phase_completion, overall_completion, created_at FROM progress_snapshots WHERE plan_id = ?1";

impl super::Database {
    fn build_snapshot_from_row(row: &Row) -> rusqlite::Result<ProgressSnapshot> {
        Ok(ProgressSnapshot {
            id: id_column(row, 0)?,
            plan_id: id_column(row, 1)?,
            task_id: optional_id_column(row, 2)?,
            completed_task_ids: json_column(row, 3)?,
            phase_completion: json_column(row, 4)?,
            overall_completion: percent_column(row, 5)?,
            created_at: timestamp_column(row, 6)?,
        })
    }

    fn completion_of_phase(conn: &Connection, phase_id: u64) -> Result<u8> {
        let (total, completed): (i64, i64) = conn
            .query_row(
                SELECT_SINGLE_PHASE_COUNTS_SQL,
                params![phase_id as i64],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .db_context("Failed to count phase tasks")?;
        Ok(progress::phase_completion(completed as usize, total as usize))
    }

    /// Recomputes and persists every phase percentage of a plan and the
    /// plan's overall percentage.
    pub(super) fn refresh_aggregates(
        conn: &Connection,
        plan_id: u64,
    ) -> Result<(BTreeMap<u64, u8>, u8)> {
        let mut stmt = conn
            .prepare(SELECT_PHASE_COUNTS_SQL)
            .db_context("Failed to prepare query")?;
        let counts = stmt
            .query_map(params![plan_id as i64], |row| {
                Ok((
                    id_column(row, 0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .db_context("Failed to count tasks per phase")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch task counts")?;

        let mut by_phase = BTreeMap::new();
        let mut percentages = Vec::with_capacity(counts.len());
        for (phase_id, total, completed) in counts {
            let percent = progress::phase_completion(completed as usize, total as usize);
            conn.execute(UPDATE_PHASE_COMPLETION_SQL, params![percent, phase_id as i64])
                .db_context("Failed to update phase completion")?;
            by_phase.insert(phase_id, percent);
            percentages.push(percent);
        }

        let overall = progress::overall_completion(&percentages);
        conn.execute(UPDATE_PLAN_COMPLETION_SQL, params![overall, plan_id as i64])
            .db_context("Failed to update plan completion")?;

        Ok((by_phase, overall))
    }

    /// Refreshes the aggregates and appends a snapshot of the result.
    ///
    /// Must run inside the transaction that changed the task status, so the
    /// snapshot order matches the order of the changes.
    pub(super) fn record_status_change(
        conn: &Connection,
        plan_id: u64,
        task_id: u64,
    ) -> Result<ProgressSnapshot> {
        let (phase_completion, overall_completion) = Self::refresh_aggregates(conn, plan_id)?;

        let mut stmt = conn
            .prepare(SELECT_COMPLETED_TASK_IDS_SQL)
            .db_context("Failed to prepare query")?;
        let completed_task_ids = stmt
            .query_map(params![plan_id as i64], |row| id_column(row, 0))
            .db_context("Failed to query completed tasks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch completed tasks")?;

        // History timestamps never go backwards, even if the clock does.
        let last: Option<String> = conn
            .query_row(SELECT_LAST_SNAPSHOT_TIME_SQL, params![plan_id as i64], |row| {
                row.get(0)
            })
            .optional()
            .db_context("Failed to query last snapshot")?;
        let now = Timestamp::now();
        let created_at = match last.and_then(|s| s.parse::<Timestamp>().ok()) {
            Some(last) if last > now => last,
            _ => now,
        };

        conn.execute(
            INSERT_SNAPSHOT_SQL,
            params![
                plan_id as i64,
                task_id as i64,
                serde_json::to_string(&completed_task_ids)?,
                serde_json::to_string(&phase_completion)?,
                overall_completion,
                created_at.to_string()
            ],
        )
        .db_context("Failed to insert progress snapshot")?;

        Ok(ProgressSnapshot {
            id: conn.last_insert_rowid() as u64,
            plan_id,
            task_id: Some(task_id),
            completed_task_ids,
            phase_completion,
            overall_completion,
            created_at,
        })
    }

    /// Recomputes and persists one phase's completion percentage.
    pub fn recompute_phase_completion(&mut self, phase_id: u64) -> Result<u8> {
        let tx = self.write_transaction()?;
        if Self::phase_plan_id(&tx, phase_id)?.is_none() {
            return Err(PlannerError::PhaseNotFound { id: phase_id });
        }

        let percent = Self::completion_of_phase(&tx, phase_id)?;
        tx.execute(UPDATE_PHASE_COMPLETION_SQL, params![percent, phase_id as i64])
            .db_context("Failed to update phase completion")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(percent)
    }

    /// Recomputes and persists a plan's phase percentages and their mean.
    pub fn recompute_overall_completion(&mut self, plan_id: u64) -> Result<u8> {
        let tx = self.write_transaction()?;
        if !Self::plan_exists(&tx, plan_id)? {
            return Err(PlannerError::PlanNotFound { id: plan_id });
        }

        let (_, overall) = Self::refresh_aggregates(&tx, plan_id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        Ok(overall)
    }

    /// Recomputes a plan's completion after a task status change and appends
    /// a progress snapshot.
    ///
    /// [`Database::update_task`](super::Database::update_task) already does
    /// this for every status change it makes.
    pub fn on_task_status_changed(
        &mut self,
        plan_id: u64,
        task_id: u64,
    ) -> Result<ProgressSnapshot> {
        let tx = self.write_transaction()?;
        if !Self::plan_exists(&tx, plan_id)? {
            return Err(PlannerError::PlanNotFound { id: plan_id });
        }
        let task = Self::require_task(&tx, task_id)?;
        if task.plan_id != plan_id {
            return Err(PlannerError::CrossPlanReference {
                reason: format!(
                    "task {task_id} belongs to plan {} not plan {plan_id}",
                    task.plan_id
                ),
            });
        }

        let snapshot = Self::record_status_change(&tx, plan_id, task_id)?;
        tx.commit().db_context("Failed to commit transaction")?;
        debug!(
            "Recorded snapshot {} for plan {plan_id}: {}%",
            snapshot.id, snapshot.overall_completion
        );
        Ok(snapshot)
    }

    /// Reads a plan's progress history, oldest first unless `newest_first`.
    pub fn get_progress_history(
        &self,
        plan_id: u64,
        newest_first: bool,
        limit: Option<u32>,
    ) -> Result<Vec<ProgressSnapshot>> {
        if !Self::plan_exists(&self.connection, plan_id)? {
            return Err(PlannerError::PlanNotFound { id: plan_id });
        }

        let direction = if newest_first { "DESC" } else { "ASC" };
        // Append order; the stored RFC 3339 text does not sort chronologically.
        let query = format!("{SELECT_SNAPSHOTS_SQL} ORDER BY id {direction} LIMIT ?2");
        // SQLite treats a negative LIMIT as unbounded
        let limit = limit.map_or(-1, i64::from);

        let mut stmt = self
            .connection
            .prepare(&query)
            .db_context("Failed to prepare query")?;
        let history = stmt
            .query_map(params![plan_id as i64, limit], Self::build_snapshot_from_row)
            .db_context("Failed to query progress history")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch progress history")?;
        Ok(history)
    }

    /// Rolls up a user's active plans for a dashboard view.
    ///
    /// An unknown user simply has no plans.
    pub fn get_user_progress_summary(&self, user_id: u64) -> Result<UserProgressSummary> {
        let plans = self.list_plans(user_id, Some(PlanStatus::Active))?;

        let total_tasks = plans.iter().map(|plan| plan.total_tasks).sum();
        let completed_tasks = plans.iter().map(|plan| plan.completed_tasks).sum();
        let completions: Vec<u8> = plans.iter().map(|plan| plan.completion).collect();
        let average_completion = progress::overall_completion(&completions);

        Ok(UserProgressSummary {
            user_id,
            active_plans: plans.len() as u32,
            total_tasks,
            completed_tasks,
            average_completion,
            plans,
        })
    }
}
