use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch database plus a command builder bound to it
struct CliTestEnvironment {
    _temp_dir: TempDir,
    db_path: String,
}

impl CliTestEnvironment {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let db_path = temp_dir
            .path()
            .join("cli_test.db")
            .to_str()
            .expect("Invalid temp path")
            .to_string();
        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    /// `trellis --no-color --database-file <db>` with the user variable cleared
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("trellis").expect("Failed to find trellis binary");
        cmd.env_remove("TRELLIS_USER_ID")
            .args(["--no-color", "--database-file", &self.db_path]);
        cmd
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self
            .cmd()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(output).expect("Invalid UTF-8")
    }
}

/// Pulls N out of the first "with ID: N" in command output
fn created_id(output: &str) -> String {
    let start = output.find("with ID: ").expect("No ID in output") + "with ID: ".len();
    output[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect()
}

#[test]
fn test_cli_create_plan() {
    let env = CliTestEnvironment::new();

    env.cmd()
        .args(["plan", "create", "7", "Open a bakery", "-d", "Sourdough first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created plan with ID: 1"))
        .stdout(predicate::str::contains("# 1. Open a bakery"))
        .stdout(predicate::str::contains("Sourdough first"));
}

#[test]
fn test_cli_duplicate_analysis_rejected() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "7", "First"]);

    env.cmd()
        .args(["plan", "create", "7", "Second"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_cli_list_empty_plans() {
    let env = CliTestEnvironment::new();

    env.cmd()
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans found."));
}

#[test]
fn test_cli_plans_are_per_user() {
    let env = CliTestEnvironment::new();

    env.cmd()
        .env("TRELLIS_USER_ID", "5")
        .args(["plan", "create", "1", "Someone else's plan"])
        .assert()
        .success();

    env.cmd()
        .args(["plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No plans found."));

    env.cmd()
        .args(["--user", "5", "plan", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Someone else's plan"));
}

#[test]
fn test_cli_delete_requires_confirm() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "1", "Keep me"]);

    env.cmd()
        .args(["plan", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--confirm"));

    env.cmd()
        .args(["plan", "delete", "1", "--confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted plan 'Keep me'"));
}

#[test]
fn test_cli_dependency_workflow() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "1", "Launch", "--phase", "Build"]);

    let design = created_id(&env.run(&["task", "add", "1", "1", "Design", "-e", "2h"]));
    let ship = created_id(&env.run(&["task", "add", "1", "1", "Ship"]));

    env.cmd()
        .args(["dep", "add", &ship, &design])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Task {ship} now waits on task {design}"
        )));

    env.cmd()
        .args(["dep", "check", &design, &ship])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rejected:"));

    env.cmd()
        .args(["dep", "add", &design, &ship])
        .assert()
        .failure()
        .stderr(predicate::str::contains("circular dependency"));

    env.cmd()
        .args(["task", "update", &ship, "--status", "completed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("incomplete prerequisites"));

    env.cmd()
        .args(["dep", "blocking", &ship])
        .assert()
        .success()
        .stdout(predicate::str::contains("Design"));

    env.cmd()
        .args(["task", "update", &design, "--status", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: completed"));

    env.cmd()
        .args(["plan", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50%"))
        .stdout(predicate::str::contains(format!("(after #{design})")));

    env.cmd()
        .args(["progress", "history", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 task(s) completed"));
}

#[test]
fn test_cli_force_completion() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "1", "Launch", "--phase", "Build"]);
    env.run(&["task", "add", "1", "1", "First"]);
    env.run(&["task", "add", "1", "1", "Second"]);
    env.run(&["dep", "add", "2", "1"]);

    env.cmd()
        .args(["task", "update", "2", "-s", "completed", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Prerequisite check overridden"));
}

#[test]
fn test_cli_reorder_tasks() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "1", "Launch", "--phase", "Build"]);
    env.run(&["task", "add", "1", "1", "Alpha"]);
    env.run(&["task", "add", "1", "1", "Beta"]);

    let output = env.run(&["task", "reorder", "1", "2,1"]);
    let beta = output.find("Beta").expect("Beta missing");
    let alpha = output.find("Alpha").expect("Alpha missing");
    assert!(beta < alpha);

    env.cmd()
        .args(["task", "reorder", "1", "2,2"])
        .assert()
        .failure();
}

#[test]
fn test_cli_export_csv() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "1", "Launch", "--phase", "Build"]);
    env.run(&["task", "add", "1", "1", "Design, then build"]);

    env.cmd()
        .args(["export", "1", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "phase,phase_order,task_id,task,status",
        ))
        .stdout(predicate::str::contains("\"Design, then build\""));

    env.cmd()
        .args(["export", "1", "--format", "pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_cli_export_to_file() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "1", "Launch", "--phase", "Build"]);
    let out_dir = TempDir::new().expect("Failed to create temporary directory");
    let out_path = out_dir.path().join("plan.md");

    env.cmd()
        .args(["export", "1", "-o", out_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported plan 1"));

    let written = std::fs::read_to_string(&out_path).expect("Export file missing");
    assert!(written.starts_with("# Launch"));
}

#[test]
fn test_cli_default_shows_summary() {
    let env = CliTestEnvironment::new();
    env.run(&["plan", "create", "1", "Launch"]);

    env.cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("# Progress for user 1"))
        .stdout(predicate::str::contains("Active plans: 1"));
}

#[test]
fn test_cli_missing_task() {
    let env = CliTestEnvironment::new();

    env.cmd()
        .args(["task", "show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task with ID 42 not found"));
}
