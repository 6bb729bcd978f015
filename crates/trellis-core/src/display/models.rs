//! Display implementations for domain models.
//!
//! Output is markdown so the CLI can render it with termimad and MCP clients
//! can show it verbatim.

use std::fmt;

use super::format::{LocalDateTime, ProgressBar};
use crate::models::{
    DependencyCheck, Phase, Plan, PlanStatus, PlanSummary, ProgressSnapshot, Task,
    TaskDependencies, TaskDependency, TaskStatus, UserProgressSummary,
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.title)?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Progress: {}", ProgressBar(self.completion))?;
        writeln!(f, "- Analysis: {}", self.analysis_id)?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if self.phases.is_empty() {
            return writeln!(f, "\nNo phases in this plan.");
        }

        for phase in &self.phases {
            writeln!(f)?;
            write!(f, "{phase}")?;
            for task in &phase.tasks {
                let prerequisites = self.prerequisites_of(task.id);
                task.fmt_line(f)?;
                if !prerequisites.is_empty() {
                    let ids: Vec<String> =
                        prerequisites.iter().map(|id| format!("#{id}")).collect();
                    write!(f, " (after {})", ids.join(", "))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} (ID: {})", self.name, self.id)?;
        writeln!(f)?;
        writeln!(f, "{}", ProgressBar(self.completion))?;
        writeln!(f)?;
        if self.tasks.is_empty() {
            writeln!(f, "_No tasks_")?;
        }
        Ok(())
    }
}

impl Task {
    /// One list item without a trailing newline, used inside plan views.
    fn fmt_line(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- **{}**. {} ({})", self.id, self.title, self.status.with_icon())?;
        if let Some(estimate) = &self.estimated_time {
            write!(f, " ~{estimate}")?;
        }
        if self.is_custom {
            write!(f, " *custom*")?;
        }
        Ok(())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.id,
            self.title,
            self.status.with_icon()
        )?;
        writeln!(f)?;
        writeln!(f, "- Plan: {} / Phase: {}", self.plan_id, self.phase_id)?;
        writeln!(f, "- Order: {}", self.order)?;
        if let Some(estimate) = &self.estimated_time {
            writeln!(f, "- Estimated time: {estimate}")?;
        }
        if self.is_custom {
            writeln!(f, "- Custom task")?;
        }
        if let Some(at) = &self.completed_at {
            match self.completed_by {
                Some(user) => writeln!(f, "- Completed: {} by user {user}", LocalDateTime(at))?,
                None => writeln!(f, "- Completed: {}", LocalDateTime(at))?,
            }
        }
        writeln!(f)?;

        if let Some(desc) = &self.description {
            writeln!(f, "{desc}")?;
            writeln!(f)?;
        }

        if !self.resources.is_empty() {
            writeln!(f, "#### Resources")?;
            writeln!(f)?;
            for resource in &self.resources {
                writeln!(f, "- {resource}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {} (ID: {}) ({}/{})",
            self.title, self.id, self.completed_tasks, self.total_tasks
        )?;
        writeln!(f)?;
        writeln!(f, "- **Status**: {}", self.status)?;
        writeln!(f, "- **Progress**: {}", ProgressBar(self.completion))?;
        writeln!(f, "- **Phases**: {}", self.total_phases)?;
        if let Some(desc) = &self.description {
            writeln!(f, "- **Description**: {desc}")?;
        }
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)
    }
}

impl fmt::Display for TaskDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- Dependency {}: task {} → task {}",
            self.id, self.prerequisite_task_id, self.dependent_task_id
        )
    }
}

fn id_list(ids: &[u64]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.iter().map(u64::to_string).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for TaskDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Dependencies of task {}", self.task_id)?;
        writeln!(f)?;
        writeln!(f, "- Waits on: {}", id_list(&self.prerequisites))?;
        writeln!(f, "- Blocks: {}", id_list(&self.dependents))
    }
}

impl fmt::Display for DependencyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            None => writeln!(
                f,
                "Task {} can be added as a prerequisite of task {}.",
                self.prerequisite_task_id, self.dependent_task_id
            ),
            Some(reason) => writeln!(f, "Rejected: {reason}"),
        }
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {} {}",
            LocalDateTime(&self.created_at),
            ProgressBar(self.overall_completion)
        )?;
        if let Some(task_id) = self.task_id {
            write!(f, " (task {task_id})")?;
        }
        writeln!(f, ", {} task(s) completed", self.completed_task_ids.len())
    }
}

impl fmt::Display for UserProgressSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Progress for user {}", self.user_id)?;
        writeln!(f)?;
        writeln!(f, "- Active plans: {}", self.active_plans)?;
        writeln!(
            f,
            "- Tasks completed: {}/{}",
            self.completed_tasks, self.total_tasks
        )?;
        writeln!(f, "- Average: {}", ProgressBar(self.average_completion))?;
        for plan in &self.plans {
            writeln!(f)?;
            write!(f, "{plan}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use jiff::Timestamp;

    use super::*;

    fn task(id: u64, status: TaskStatus) -> Task {
        Task {
            id,
            phase_id: 1,
            plan_id: 1,
            title: format!("Task {id}"),
            description: Some("Details".to_string()),
            estimated_time: Some("2h".to_string()),
            resources: vec!["https://example.com".to_string()],
            order: 0,
            is_custom: true,
            status,
            completed_at: None,
            completed_by: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_task_display() {
        let output = task(3, TaskStatus::InProgress).to_string();
        assert!(output.contains("### 3. Task 3 (➤ In Progress)"));
        assert!(output.contains("Estimated time: 2h"));
        assert!(output.contains("- https://example.com"));
    }

    #[test]
    fn test_plan_display_lists_phases_and_prerequisites() {
        let plan = Plan {
            id: 1,
            user_id: 1,
            analysis_id: 9,
            title: "Launch".to_string(),
            description: None,
            status: PlanStatus::Active,
            completion: 50,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
            phases: vec![Phase {
                id: 1,
                plan_id: 1,
                name: "Build".to_string(),
                order: 0,
                completion: 50,
                tasks: vec![task(1, TaskStatus::Completed), task(2, TaskStatus::NotStarted)],
            }],
            dependencies: vec![TaskDependency {
                id: 1,
                plan_id: 1,
                prerequisite_task_id: 1,
                dependent_task_id: 2,
                created_at: Timestamp::UNIX_EPOCH,
            }],
        };
        let output = plan.to_string();
        assert!(output.starts_with("# 1. Launch"));
        assert!(output.contains("## Build (ID: 1)"));
        assert!(output.contains("- **1**. Task 1 (✓ Completed)"));
        assert!(output.contains("(○ Not Started) ~2h *custom* (after #1)"));
    }

    #[test]
    fn test_dependency_check_display() {
        let ok = DependencyCheck {
            prerequisite_task_id: 1,
            dependent_task_id: 2,
            valid: true,
            reason: None,
        };
        assert!(ok.to_string().contains("can be added"));

        let rejected = DependencyCheck {
            reason: Some("would create a circular dependency".to_string()),
            valid: false,
            ..ok
        };
        assert!(rejected.to_string().starts_with("Rejected:"));
    }

    #[test]
    fn test_snapshot_display() {
        let snapshot = ProgressSnapshot {
            id: 1,
            plan_id: 1,
            task_id: Some(4),
            completed_task_ids: vec![1, 4],
            phase_completion: BTreeMap::new(),
            overall_completion: 50,
            created_at: Timestamp::UNIX_EPOCH,
        };
        let output = snapshot.to_string();
        assert!(output.contains("50%"));
        assert!(output.contains("(task 4), 2 task(s) completed"));
    }

    #[test]
    fn test_task_dependencies_display() {
        let deps = TaskDependencies {
            task_id: 2,
            prerequisites: vec![1],
            dependents: vec![],
        };
        let output = deps.to_string();
        assert!(output.contains("Waits on: 1"));
        assert!(output.contains("Blocks: none"));
    }
}
