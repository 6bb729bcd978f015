//! Result wrapper types for displaying operation outcomes.
//!
//! Create and update results lead with a one-line confirmation followed by
//! the resource itself; delete results are a single line.

use std::fmt;

use crate::models::{Phase, Plan, Task, TaskDependency};

/// Outcome of a create operation.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created plan with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Phase> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Created phase with ID: {} in plan {}",
            self.resource.id, self.resource.plan_id
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created task with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<TaskDependency> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Task {} now waits on task {} (dependency ID: {})",
            self.resource.dependent_task_id, self.resource.prerequisite_task_id, self.resource.id
        )
    }
}

/// Outcome of an update operation, with an optional list of changes.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for UpdateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated plan with ID: {}", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated task with ID: {}", self.resource.id)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Outcome of a delete operation.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted plan '{}' (ID: {}) with {} phase(s) and {} task(s)",
            self.resource.title,
            self.resource.id,
            self.resource.phases.len(),
            self.resource.tasks().count()
        )
    }
}

impl fmt::Display for DeleteResult<Phase> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted phase '{}' (ID: {}) with {} task(s)",
            self.resource.name,
            self.resource.id,
            self.resource.tasks.len()
        )
    }
}

impl fmt::Display for DeleteResult<Task> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted task '{}' (ID: {})",
            self.resource.title, self.resource.id
        )
    }
}

impl fmt::Display for DeleteResult<TaskDependency> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Removed dependency {} (task {} no longer waits on task {})",
            self.resource.id, self.resource.dependent_task_id, self.resource.prerequisite_task_id
        )
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::TaskStatus;

    fn task() -> Task {
        Task {
            id: 7,
            phase_id: 1,
            plan_id: 1,
            title: "Write docs".to_string(),
            description: None,
            estimated_time: None,
            resources: Vec::new(),
            order: 0,
            is_custom: true,
            status: TaskStatus::Completed,
            completed_at: Some(Timestamp::UNIX_EPOCH),
            completed_by: Some(3),
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_update_result_lists_changes() {
        let result = UpdateResult::with_changes(task(), vec!["Status: completed".to_string()]);
        let output = result.to_string();
        assert!(output.starts_with("Updated task with ID: 7"));
        assert!(output.contains("Changes made:\n- Status: completed"));
        assert!(output.contains("by user 3"));
    }

    #[test]
    fn test_delete_dependency_result() {
        let edge = TaskDependency {
            id: 4,
            plan_id: 1,
            prerequisite_task_id: 1,
            dependent_task_id: 2,
            created_at: Timestamp::UNIX_EPOCH,
        };
        assert_eq!(
            DeleteResult::new(edge).to_string(),
            "Removed dependency 4 (task 2 no longer waits on task 1)\n"
        );
    }
}
