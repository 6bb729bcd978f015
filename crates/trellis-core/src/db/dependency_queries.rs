//! Prerequisite edge operations and queries.

use jiff::Timestamp;
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::utils::{id_column, timestamp_column};
use crate::{
    error::{DatabaseResultExt, PlannerError, Result},
    graph::{self, DependencyGraph},
    models::{DependencyCheck, Task, TaskDependencies, TaskDependency},
};

const INSERT_DEPENDENCY_SQL: &str = "INSERT INTO task_dependencies (plan_id, prerequisite_task_id, dependent_task_id, created_at) VALUES (?1, ?2, ?3, ?4)";
const SELECT_DEPENDENCY_SQL: &str = "SELECT id, plan_id, prerequisite_task_id, dependent_task_id, created_at FROM task_dependencies WHERE id = ?1";
const SELECT_DEPENDENCIES_BY_PLAN_SQL: &str = "SELECT id, plan_id, prerequisite_task_id, dependent_task_id, created_at FROM task_dependencies WHERE plan_id = ?1 ORDER BY id";
const CHECK_DEPENDENCY_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM task_dependencies WHERE prerequisite_task_id = ?1 AND dependent_task_id = ?2)";
const SELECT_PREREQUISITE_IDS_SQL: &str = "SELECT prerequisite_task_id FROM task_dependencies WHERE dependent_task_id = ?1 ORDER BY prerequisite_task_id";
const SELECT_DEPENDENT_IDS_SQL: &str = "SELECT dependent_task_id FROM task_dependencies WHERE prerequisite_task_id = ?1 ORDER BY dependent_task_id";
const SELECT_INCOMPLETE_PREREQUISITES_SQL: &str = "SELECT t.id, t.phase_id, t.plan_id, t.title, t.description, t.estimated_time, t.resources, t.task_order, t.is_custom, t.status, t.completed_at, t.completed_by, t.created_at, t.updated_at FROM tasks t JOIN task_dependencies d ON d.prerequisite_task_id = t.id WHERE d.dependent_task_id = ?1 AND t.status <> 'completed' ORDER BY t.id";
const DELETE_DEPENDENCY_SQL: &str = "DELETE FROM task_dependencies WHERE id = ?1";

impl super::Database {
    fn build_dependency_from_row(row: &Row) -> rusqlite::Result<TaskDependency> {
        Ok(TaskDependency {
            id: id_column(row, 0)?,
            plan_id: id_column(row, 1)?,
            prerequisite_task_id: id_column(row, 2)?,
            dependent_task_id: id_column(row, 3)?,
            created_at: timestamp_column(row, 4)?,
        })
    }

    pub(super) fn dependencies_of_plan(
        conn: &Connection,
        plan_id: u64,
    ) -> Result<Vec<TaskDependency>> {
        let mut stmt = conn
            .prepare(SELECT_DEPENDENCIES_BY_PLAN_SQL)
            .db_context("Failed to prepare query")?;
        let dependencies = stmt
            .query_map(params![plan_id as i64], Self::build_dependency_from_row)
            .db_context("Failed to query dependencies")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch dependencies")?;
        Ok(dependencies)
    }

    /// Prerequisites of `task_id` whose status is anything but `completed`.
    pub(super) fn incomplete_prerequisites(conn: &Connection, task_id: u64) -> Result<Vec<Task>> {
        let mut stmt = conn
            .prepare(SELECT_INCOMPLETE_PREREQUISITES_SQL)
            .db_context("Failed to prepare query")?;
        let prerequisites = stmt
            .query_map(params![task_id as i64], Self::build_task_from_row)
            .db_context("Failed to query prerequisites")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch prerequisites")?;
        Ok(prerequisites)
    }

    fn linked_ids(conn: &Connection, sql: &str, task_id: u64) -> Result<Vec<u64>> {
        let mut stmt = conn.prepare(sql).db_context("Failed to prepare query")?;
        let ids = stmt
            .query_map(params![task_id as i64], |row| id_column(row, 0))
            .db_context("Failed to query dependencies")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch dependencies")?;
        Ok(ids)
    }

    /// Runs every check a new `prerequisite -> dependent` edge must pass and
    /// returns the plan both tasks belong to.
    ///
    /// Checks run in a fixed order: self-loop, existence of both tasks, plan
    /// membership, duplicate edge, cycle.
    fn check_new_dependency(conn: &Connection, prerequisite: u64, dependent: u64) -> Result<u64> {
        if prerequisite == dependent {
            return Err(PlannerError::SelfDependency { task_id: dependent });
        }

        let prerequisite_task = Self::require_task(conn, prerequisite)?;
        let dependent_task = Self::require_task(conn, dependent)?;
        if prerequisite_task.plan_id != dependent_task.plan_id {
            return Err(PlannerError::CrossPlanReference {
                reason: format!(
                    "task {prerequisite} belongs to plan {} but task {dependent} belongs to plan {}",
                    prerequisite_task.plan_id, dependent_task.plan_id
                ),
            });
        }

        let duplicate: bool = conn
            .query_row(
                CHECK_DEPENDENCY_EXISTS_SQL,
                params![prerequisite as i64, dependent as i64],
                |row| row.get(0),
            )
            .db_context("Failed to check for an existing dependency")?;
        if duplicate {
            return Err(PlannerError::DuplicateDependency {
                prerequisite_id: prerequisite,
                dependent_id: dependent,
            });
        }

        let edges = Self::dependencies_of_plan(conn, dependent_task.plan_id)?;
        if graph::would_create_cycle(&edges, prerequisite, dependent) {
            return Err(PlannerError::CircularDependency {
                prerequisite_id: prerequisite,
                dependent_id: dependent,
            });
        }

        Ok(dependent_task.plan_id)
    }

    /// Makes `prerequisite_task_id` a prerequisite of `dependent_task_id`.
    ///
    /// The cycle check and the insert share one immediate transaction, so
    /// two concurrent calls can never jointly close a cycle.
    pub fn add_dependency(
        &mut self,
        dependent_task_id: u64,
        prerequisite_task_id: u64,
    ) -> Result<TaskDependency> {
        let tx = self.write_transaction()?;
        let plan_id = Self::check_new_dependency(&tx, prerequisite_task_id, dependent_task_id)?;

        let now = Timestamp::now().to_string();
        tx.execute(
            INSERT_DEPENDENCY_SQL,
            params![
                plan_id as i64,
                prerequisite_task_id as i64,
                dependent_task_id as i64,
                &now
            ],
        )
        .db_context("Failed to insert dependency")?;
        let id = tx.last_insert_rowid();

        let edge = tx
            .query_row(
                SELECT_DEPENDENCY_SQL,
                params![id],
                Self::build_dependency_from_row,
            )
            .db_context("Failed to query dependency")?;
        Self::touch_plan(&tx, plan_id, &now)?;

        tx.commit().db_context("Failed to commit transaction")?;
        debug!("Task {prerequisite_task_id} is now a prerequisite of task {dependent_task_id}");
        Ok(edge)
    }

    /// Pre-flights an edge without writing anything.
    ///
    /// Invariant violations are reported in the returned check; unknown task
    /// IDs are still errors.
    pub fn validate_dependency(
        &self,
        dependent_task_id: u64,
        prerequisite_task_id: u64,
    ) -> Result<DependencyCheck> {
        let outcome =
            Self::check_new_dependency(&self.connection, prerequisite_task_id, dependent_task_id);

        let reason = match outcome {
            Ok(_) => None,
            Err(e) if e.is_validation() => Some(e.to_string()),
            Err(e) => return Err(e),
        };

        Ok(DependencyCheck {
            prerequisite_task_id,
            dependent_task_id,
            valid: reason.is_none(),
            reason,
        })
    }

    /// Removes an edge by ID, returning it.
    pub fn remove_dependency(&mut self, id: u64) -> Result<TaskDependency> {
        let tx = self.write_transaction()?;
        let edge = tx
            .query_row(
                SELECT_DEPENDENCY_SQL,
                params![id as i64],
                Self::build_dependency_from_row,
            )
            .optional()
            .db_context("Failed to query dependency")?
            .ok_or(PlannerError::DependencyNotFound { id })?;

        tx.execute(DELETE_DEPENDENCY_SQL, params![id as i64])
            .db_context("Failed to delete dependency")?;
        Self::touch_plan(&tx, edge.plan_id, &Timestamp::now().to_string())?;

        tx.commit().db_context("Failed to commit transaction")?;
        debug!(
            "Removed dependency {id} ({} -> {})",
            edge.prerequisite_task_id, edge.dependent_task_id
        );
        Ok(edge)
    }

    /// Both directions of a task's dependency neighbourhood.
    pub fn get_dependencies(&self, task_id: u64) -> Result<TaskDependencies> {
        Self::require_task(&self.connection, task_id)?;

        Ok(TaskDependencies {
            task_id,
            prerequisites: Self::linked_ids(
                &self.connection,
                SELECT_PREREQUISITE_IDS_SQL,
                task_id,
            )?,
            dependents: Self::linked_ids(&self.connection, SELECT_DEPENDENT_IDS_SQL, task_id)?,
        })
    }

    /// Prerequisite tasks of `task_id` that are not completed yet.
    ///
    /// Skipped prerequisites are included: skipping is not completing.
    pub fn get_incomplete_prerequisites(&self, task_id: u64) -> Result<Vec<Task>> {
        Self::require_task(&self.connection, task_id)?;
        Self::incomplete_prerequisites(&self.connection, task_id)
    }

    /// Every edge of a plan, oldest first.
    pub fn list_plan_dependencies(&self, plan_id: u64) -> Result<Vec<TaskDependency>> {
        if !Self::plan_exists(&self.connection, plan_id)? {
            return Err(PlannerError::PlanNotFound { id: plan_id });
        }
        Self::dependencies_of_plan(&self.connection, plan_id)
    }

    /// Task IDs of a plan ordered so every prerequisite precedes its
    /// dependents. Ties break by ascending ID.
    pub fn topological_order(&self, plan_id: u64) -> Result<Vec<u64>> {
        let tasks = self.list_tasks(plan_id)?;
        let edges = Self::dependencies_of_plan(&self.connection, plan_id)?;

        DependencyGraph::from_dependencies(&edges)
            .topological_order(tasks.iter().map(|task| task.id))
            .ok_or_else(|| PlannerError::Configuration {
                message: format!("Dependency graph of plan {plan_id} contains a cycle"),
            })
    }
}
