mod common;

use common::{create_test_db, seed_plan};
use trellis_core::{
    PlannerError, TaskStatus, UpdateTaskRequest,
    params::{CreatePhase, CreateTask},
};

fn complete(db: &mut trellis_core::Database, task_id: u64) {
    db.update_task(task_id, &UpdateTaskRequest::status(TaskStatus::Completed))
        .expect("Failed to complete task");
}

#[test]
fn test_database_initialization() {
    let (temp_file, db) = create_test_db();
    assert!(temp_file.path().exists());
    assert!(db.list_plans(1, None).expect("Failed to list").is_empty());
}

#[test]
fn test_reopen_keeps_data() {
    let (temp_file, mut db) = create_test_db();
    let (plan, _) = seed_plan(&mut db, 1, &[2]);
    drop(db);

    let db = trellis_core::Database::new(temp_file.path()).expect("Failed to reopen");
    let reloaded = db.get_plan(plan.id).unwrap().expect("Plan should exist");
    assert_eq!(reloaded.phases[0].tasks.len(), 2);
}

#[test]
fn test_cycle_rejected_and_graph_unchanged() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[3]);
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    db.add_dependency(b, a).expect("a -> b");
    db.add_dependency(c, b).expect("b -> c");

    let err = db.add_dependency(a, c).unwrap_err();
    assert!(matches!(
        err,
        PlannerError::CircularDependency {
            prerequisite_id,
            dependent_id,
        } if prerequisite_id == c && dependent_id == a
    ));
    assert_eq!(db.list_plan_dependencies(plan.id).unwrap().len(), 2);
}

#[test]
fn test_self_dependency_rejected() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[1]);

    let err = db.add_dependency(ids[0], ids[0]).unwrap_err();
    assert!(matches!(err, PlannerError::SelfDependency { .. }));
}

#[test]
fn test_duplicate_dependency_rejected() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[2]);

    db.add_dependency(ids[1], ids[0]).unwrap();
    let err = db.add_dependency(ids[1], ids[0]).unwrap_err();
    assert!(matches!(err, PlannerError::DuplicateDependency { .. }));
}

#[test]
fn test_cross_plan_dependency_rejected() {
    let (_temp_file, mut db) = create_test_db();
    let (_, first) = seed_plan(&mut db, 1, &[1]);
    let (_, second) = seed_plan(&mut db, 2, &[1]);

    let err = db.add_dependency(first[0], second[0]).unwrap_err();
    assert!(matches!(err, PlannerError::CrossPlanReference { .. }));
}

#[test]
fn test_unknown_task_in_dependency() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[1]);

    let err = db.add_dependency(ids[0], 999).unwrap_err();
    assert!(err.is_not_found());
    let err = db.validate_dependency(999, ids[0]).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_validate_dependency_does_not_write() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[2]);
    db.add_dependency(ids[1], ids[0]).unwrap();

    let check = db
        .validate_dependency(ids[0], ids[1])
        .expect("Validation should not error");
    assert!(!check.valid);
    assert!(check.reason.unwrap().contains("circular"));

    let fresh = db.validate_dependency(ids[1], ids[0]).unwrap();
    assert!(!fresh.valid);

    assert_eq!(db.list_plan_dependencies(plan.id).unwrap().len(), 1);
}

#[test]
fn test_remove_dependency() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[2]);
    let edge = db.add_dependency(ids[1], ids[0]).unwrap();

    let removed = db.remove_dependency(edge.id).unwrap();
    assert_eq!(removed, edge);
    assert!(db.get_dependencies(ids[1]).unwrap().prerequisites.is_empty());

    let err = db.remove_dependency(edge.id).unwrap_err();
    assert!(matches!(err, PlannerError::DependencyNotFound { .. }));

    // The reverse edge is legal once the original is gone
    db.add_dependency(ids[0], ids[1]).unwrap();
}

#[test]
fn test_get_dependencies_both_directions() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[3]);
    db.add_dependency(ids[1], ids[0]).unwrap();
    db.add_dependency(ids[2], ids[1]).unwrap();

    let deps = db.get_dependencies(ids[1]).unwrap();
    assert_eq!(deps.prerequisites, vec![ids[0]]);
    assert_eq!(deps.dependents, vec![ids[2]]);
}

#[test]
fn test_completion_gate_and_override() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[2]);
    db.add_dependency(ids[1], ids[0]).unwrap();

    let err = db
        .update_task(ids[1], &UpdateTaskRequest::status(TaskStatus::Completed))
        .unwrap_err();
    match err {
        PlannerError::IncompletePrerequisites {
            task_id,
            prerequisite_ids,
        } => {
            assert_eq!(task_id, ids[1]);
            assert_eq!(prerequisite_ids, vec![ids[0]]);
        }
        other => panic!("unexpected error: {other}"),
    }
    let task = db.get_task(ids[1]).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::NotStarted);

    let task = db
        .update_task(
            ids[1],
            &UpdateTaskRequest::status(TaskStatus::Completed)
                .by(42)
                .overriding_prerequisites(),
        )
        .unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.completed_by, Some(42));
    assert!(task.completed_at.is_some());
}

#[test]
fn test_in_progress_is_not_gated() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[2]);
    db.add_dependency(ids[1], ids[0]).unwrap();

    let task = db
        .update_task(ids[1], &UpdateTaskRequest::status(TaskStatus::InProgress))
        .unwrap();
    assert_eq!(task.status, TaskStatus::InProgress);
}

#[test]
fn test_skipped_prerequisite_still_blocks() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[2]);
    db.add_dependency(ids[1], ids[0]).unwrap();
    db.update_task(ids[0], &UpdateTaskRequest::status(TaskStatus::Skipped))
        .unwrap();

    let blocking = db.get_incomplete_prerequisites(ids[1]).unwrap();
    assert_eq!(blocking.len(), 1);
    assert_eq!(blocking[0].status, TaskStatus::Skipped);
}

#[test]
fn test_reopening_clears_completion() {
    let (_temp_file, mut db) = create_test_db();
    let (_, ids) = seed_plan(&mut db, 1, &[1]);
    complete(&mut db, ids[0]);

    let task = db
        .update_task(ids[0], &UpdateTaskRequest::status(TaskStatus::InProgress))
        .unwrap();
    assert!(task.completed_at.is_none());
    assert!(task.completed_by.is_none());
}

#[test]
fn test_overall_is_mean_of_phase_percentages() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[1, 3, 1]);
    complete(&mut db, ids[0]);
    complete(&mut db, ids[1]);

    let plan = db.get_plan(plan.id).unwrap().unwrap();
    let phases: Vec<u8> = plan.phases.iter().map(|p| p.completion).collect();
    assert_eq!(phases, vec![100, 33, 0]);
    assert_eq!(plan.completion, 44);
}

#[test]
fn test_empty_phase_counts_as_zero() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[1]);
    complete(&mut db, ids[0]);
    assert_eq!(db.get_plan(plan.id).unwrap().unwrap().completion, 100);

    db.create_phase(&CreatePhase {
        plan_id: plan.id,
        name: "Later".to_string(),
        order: None,
    })
    .unwrap();
    assert_eq!(db.get_plan(plan.id).unwrap().unwrap().completion, 50);
}

#[test]
fn test_skipped_is_not_completed_for_progress() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[2]);
    db.update_task(ids[0], &UpdateTaskRequest::status(TaskStatus::Skipped))
        .unwrap();

    assert_eq!(db.recompute_overall_completion(plan.id).unwrap(), 0);
}

#[test]
fn test_recompute_phase_completion() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[3]);
    complete(&mut db, ids[0]);
    complete(&mut db, ids[1]);

    let phase_id = plan.phases[0].id;
    assert_eq!(db.recompute_phase_completion(phase_id).unwrap(), 67);
    assert!(db.recompute_phase_completion(999).unwrap_err().is_not_found());
}

#[test]
fn test_history_tracks_status_changes_only() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[2]);

    complete(&mut db, ids[0]);
    db.update_task(
        ids[0],
        &UpdateTaskRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    complete(&mut db, ids[1]);
    db.update_task(ids[1], &UpdateTaskRequest::status(TaskStatus::NotStarted))
        .unwrap();

    let history = db.get_progress_history(plan.id, false, None).unwrap();
    let overall: Vec<u8> = history.iter().map(|s| s.overall_completion).collect();
    assert_eq!(overall, vec![50, 100, 50]);
    assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    assert_eq!(history[1].completed_task_ids, vec![ids[0], ids[1]]);
    assert_eq!(history[2].task_id, Some(ids[1]));

    let current = db.get_plan(plan.id).unwrap().unwrap().completion;
    assert_eq!(history.last().unwrap().overall_completion, current);

    let newest = db.get_progress_history(plan.id, true, Some(1)).unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].id, history[2].id);
}

#[test]
fn test_history_is_chronological_across_fraction_widths() {
    let (temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[1]);
    complete(&mut db, ids[0]);
    db.update_task(ids[0], &UpdateTaskRequest::status(TaskStatus::NotStarted))
        .unwrap();

    // Timestamps render without trailing zeros, so ".15Z" sorts before ".1Z" as text
    let raw = rusqlite::Connection::open(temp_file.path()).expect("Failed to open raw connection");
    let first: jiff::Timestamp = "2025-01-01T12:00:00.100Z".parse().unwrap();
    let second: jiff::Timestamp = "2025-01-01T12:00:00.150Z".parse().unwrap();
    for (snapshot, at) in db
        .get_progress_history(plan.id, false, None)
        .unwrap()
        .iter()
        .zip([first, second])
    {
        raw.execute(
            "UPDATE progress_snapshots SET created_at = ?1 WHERE id = ?2",
            rusqlite::params![at.to_string(), snapshot.id as i64],
        )
        .unwrap();
    }
    drop(raw);

    let history = db.get_progress_history(plan.id, false, None).unwrap();
    let times: Vec<_> = history.iter().map(|s| s.created_at).collect();
    assert_eq!(times, vec![first, second]);
    assert_eq!(
        history.iter().map(|s| s.overall_completion).collect::<Vec<_>>(),
        vec![100, 0]
    );

    let newest = db.get_progress_history(plan.id, true, None).unwrap();
    assert_eq!(newest[0].created_at, second);
}

#[test]
fn test_on_task_status_changed_checks_plan() {
    let (_temp_file, mut db) = create_test_db();
    let (first, first_ids) = seed_plan(&mut db, 1, &[1]);
    let (second, _) = seed_plan(&mut db, 2, &[1]);

    let snapshot = db.on_task_status_changed(first.id, first_ids[0]).unwrap();
    assert_eq!(snapshot.overall_completion, 0);

    let err = db
        .on_task_status_changed(second.id, first_ids[0])
        .unwrap_err();
    assert!(matches!(err, PlannerError::CrossPlanReference { .. }));
}

#[test]
fn test_delete_task_removes_edges() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[3]);
    db.add_dependency(ids[1], ids[0]).unwrap();
    db.add_dependency(ids[2], ids[1]).unwrap();

    let removed = db.delete_task(ids[1]).unwrap();
    assert_eq!(removed.id, ids[1]);
    assert!(db.list_plan_dependencies(plan.id).unwrap().is_empty());
    assert!(db.get_task(ids[1]).unwrap().is_none());
}

#[test]
fn test_delete_plan_cascades() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[2, 1]);
    db.add_dependency(ids[1], ids[0]).unwrap();
    complete(&mut db, ids[0]);

    db.delete_plan(plan.id).unwrap();

    assert!(db.get_plan(plan.id).unwrap().is_none());
    for id in ids {
        assert!(db.get_task(id).unwrap().is_none());
    }
    assert!(db.get_progress_history(plan.id, false, None).is_err());
    assert!(db.get_phase(plan.phases[0].id).unwrap().is_none());
}

#[test]
fn test_delete_phase_cascades() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[1, 1]);
    db.add_dependency(ids[1], ids[0]).unwrap();

    let removed = db.delete_phase(plan.phases[0].id).unwrap();
    assert_eq!(removed.tasks.len(), 1);
    assert!(db.list_plan_dependencies(plan.id).unwrap().is_empty());
    assert_eq!(db.list_tasks(plan.id).unwrap().len(), 1);
}

#[test]
fn test_reorder_tasks() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[3]);
    let phase_id = plan.phases[0].id;

    let tasks = db
        .reorder_tasks(phase_id, &[ids[2], ids[0], ids[1]])
        .unwrap();
    let order: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    assert_eq!(order, vec![ids[2], ids[0], ids[1]]);
}

#[test]
fn test_reorder_rejects_foreign_and_duplicate_ids() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[2, 1]);
    let phase_id = plan.phases[0].id;

    let err = db.reorder_tasks(phase_id, &[ids[1], ids[1]]).unwrap_err();
    assert!(err.is_validation());

    // The first update is rolled back with the rest
    let err = db.reorder_tasks(phase_id, &[ids[1], ids[2]]).unwrap_err();
    assert!(err.is_validation());
    let order: Vec<u64> = db
        .list_phase_tasks(phase_id)
        .unwrap()
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(order, vec![ids[0], ids[1]]);

    assert!(db.reorder_tasks(999, &[]).unwrap_err().is_not_found());
}

#[test]
fn test_create_task_checks_phase_plan() {
    let (_temp_file, mut db) = create_test_db();
    let (first, _) = seed_plan(&mut db, 1, &[1]);
    let (second, _) = seed_plan(&mut db, 2, &[1]);

    let err = db
        .create_task(&CreateTask {
            plan_id: first.id,
            phase_id: second.phases[0].id,
            title: "Misplaced".to_string(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, PlannerError::PhaseNotFound { .. }));
}

#[test]
fn test_create_task_lowers_completion() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[1]);
    complete(&mut db, ids[0]);

    db.create_task(&CreateTask {
        plan_id: plan.id,
        phase_id: plan.phases[0].id,
        title: "One more thing".to_string(),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(db.get_plan(plan.id).unwrap().unwrap().completion, 50);
}

#[test]
fn test_topological_order() {
    let (_temp_file, mut db) = create_test_db();
    let (plan, ids) = seed_plan(&mut db, 1, &[3]);
    db.add_dependency(ids[0], ids[2]).unwrap();

    let order = db.topological_order(plan.id).unwrap();
    let pos = |id| order.iter().position(|x| *x == id).unwrap();
    assert!(pos(ids[2]) < pos(ids[0]));
    assert_eq!(order.len(), 3);
}

#[test]
fn test_user_progress_summary() {
    let (_temp_file, mut db) = create_test_db();
    let (_, first_ids) = seed_plan(&mut db, 1, &[2]);
    seed_plan(&mut db, 2, &[1]);
    complete(&mut db, first_ids[0]);

    let summary = db.get_user_progress_summary(1).unwrap();
    assert_eq!(summary.active_plans, 2);
    assert_eq!(summary.total_tasks, 3);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(summary.average_completion, 25);

    let nobody = db.get_user_progress_summary(77).unwrap();
    assert_eq!(nobody.active_plans, 0);
    assert_eq!(nobody.average_completion, 0);
}
