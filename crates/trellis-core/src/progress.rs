//! Completion arithmetic.
//!
//! Percentages are whole numbers in `0..=100`, rounded half away from zero.
//! Integer arithmetic keeps results exact: `round(100 * a / b)` is computed as
//! `(200 * a + b) / (2 * b)`.

use std::collections::BTreeMap;

use crate::models::{Phase, Plan, Task};

/// Completion of a single phase: `round(100 * completed / total)`.
///
/// A phase without tasks is 0% complete.
pub fn phase_completion(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u8
}

/// Completion of a plan: the rounded arithmetic mean of its phase
/// percentages, so every phase weighs the same regardless of its task count.
///
/// A plan without phases is 0% complete.
pub fn overall_completion(phase_percentages: &[u8]) -> u8 {
    if phase_percentages.is_empty() {
        return 0;
    }
    let sum: u64 = phase_percentages.iter().map(|p| u64::from(*p)).sum();
    let count = phase_percentages.len() as u64;
    ((2 * sum + count) / (2 * count)) as u8
}

/// Completion of a set of tasks.
pub fn tasks_completion(tasks: &[Task]) -> u8 {
    let completed = tasks.iter().filter(|t| t.status.is_completed()).count();
    phase_completion(completed, tasks.len())
}

/// Per-phase completion map and overall completion for loaded phases.
pub fn plan_completion(phases: &[Phase]) -> (BTreeMap<u64, u8>, u8) {
    let by_phase: BTreeMap<u64, u8> = phases
        .iter()
        .map(|phase| (phase.id, tasks_completion(&phase.tasks)))
        .collect();
    let percentages: Vec<u8> = phases.iter().map(|phase| by_phase[&phase.id]).collect();
    (by_phase, overall_completion(&percentages))
}

/// IDs of completed tasks in a loaded plan, ascending.
pub fn completed_task_ids(plan: &Plan) -> Vec<u64> {
    let mut ids: Vec<u64> = plan
        .tasks()
        .filter(|task| task.status.is_completed())
        .map(|task| task.id)
        .collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_completion_rounding() {
        assert_eq!(phase_completion(0, 0), 0);
        assert_eq!(phase_completion(0, 4), 0);
        assert_eq!(phase_completion(1, 3), 33);
        assert_eq!(phase_completion(2, 3), 67);
        assert_eq!(phase_completion(1, 8), 13);
        assert_eq!(phase_completion(3, 3), 100);
    }

    #[test]
    fn test_overall_is_mean_of_phases() {
        assert_eq!(overall_completion(&[]), 0);
        assert_eq!(overall_completion(&[100, 50, 0]), 50);
        assert_eq!(overall_completion(&[100, 33, 0]), 44);
        assert_eq!(overall_completion(&[100, 0]), 50);
        assert_eq!(overall_completion(&[100, 100, 100]), 100);
    }

    #[test]
    fn test_overall_is_not_task_weighted() {
        // 1/1, 1/3 and 0/2 complete: task-weighted would be 33
        let phases = [
            phase_completion(1, 1),
            phase_completion(1, 3),
            phase_completion(0, 2),
        ];
        assert_eq!(overall_completion(&phases), 44);
    }
}
