#![allow(dead_code)]

use tempfile::{NamedTempFile, TempDir};
use trellis_core::{
    Database, Plan, PlannerBuilder,
    params::{CreatePlan, PhaseTemplate, TaskTemplate},
};

/// Helper function to create a test planner
pub async fn create_test_planner() -> (TempDir, trellis_core::Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let planner = PlannerBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

/// Helper function to create a temporary database for testing
pub fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

/// Plan parameters with one phase per entry of `phases`, each holding that
/// many tasks titled "P<phase>T<task>".
pub fn plan_params(analysis_id: u64, phases: &[usize]) -> CreatePlan {
    CreatePlan {
        user_id: 1,
        analysis_id,
        title: format!("Plan for analysis {analysis_id}"),
        description: None,
        phases: phases
            .iter()
            .enumerate()
            .map(|(p, &count)| PhaseTemplate {
                name: format!("Phase {}", p + 1),
                tasks: (0..count)
                    .map(|t| TaskTemplate {
                        title: format!("P{}T{}", p + 1, t + 1),
                        ..Default::default()
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Creates a plan and returns it with its task IDs in plan order.
pub fn seed_plan(db: &mut Database, analysis_id: u64, phases: &[usize]) -> (Plan, Vec<u64>) {
    let plan = db
        .create_plan(&plan_params(analysis_id, phases))
        .expect("Failed to create plan");
    let ids = plan.tasks().map(|task| task.id).collect();
    (plan, ids)
}
