//! Dependency operations for the Planner.

use super::Planner;
use crate::{
    error::Result,
    models::{DependencyCheck, Task, TaskDependencies, TaskDependency},
    params::{AddDependency, Id},
};

impl Planner {
    /// Makes one task a prerequisite of another.
    ///
    /// Rejects self-loops, edges across plans, duplicates, and any edge that
    /// would close a cycle.
    pub async fn add_dependency(&self, params: &AddDependency) -> Result<TaskDependency> {
        let (task_id, prerequisite_id) = (params.task_id, params.prerequisite_task_id);
        self.with_db(move |db| db.add_dependency(task_id, prerequisite_id)).await
    }

    /// Checks whether an edge could be added, without adding it.
    pub async fn validate_dependency(&self, params: &AddDependency) -> Result<DependencyCheck> {
        let (task_id, prerequisite_id) = (params.task_id, params.prerequisite_task_id);
        self.with_db(move |db| db.validate_dependency(task_id, prerequisite_id)).await
    }

    /// Removes an edge by its ID.
    pub async fn remove_dependency(&self, params: &Id) -> Result<TaskDependency> {
        let dependency_id = params.id;
        self.with_db(move |db| db.remove_dependency(dependency_id)).await
    }

    /// Prerequisites and dependents of a task.
    pub async fn get_dependencies(&self, params: &Id) -> Result<TaskDependencies> {
        let task_id = params.id;
        self.with_db(move |db| db.get_dependencies(task_id)).await
    }

    /// Prerequisites of a task that still block its completion.
    pub async fn get_incomplete_prerequisites(&self, params: &Id) -> Result<Vec<Task>> {
        let task_id = params.id;
        self.with_db(move |db| db.get_incomplete_prerequisites(task_id)).await
    }

    /// Every edge of a plan.
    pub async fn list_plan_dependencies(&self, params: &Id) -> Result<Vec<TaskDependency>> {
        let plan_id = params.id;
        self.with_db(move |db| db.list_plan_dependencies(plan_id)).await
    }

    /// Task IDs of a plan in an order that respects every edge.
    pub async fn topological_order(&self, params: &Id) -> Result<Vec<u64>> {
        let plan_id = params.id;
        self.with_db(move |db| db.topological_order(plan_id)).await
    }
}
