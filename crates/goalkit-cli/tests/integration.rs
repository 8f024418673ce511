#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn goalkit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("goalkit").unwrap();
    cmd.current_dir(dir.path())
        .env("GOALKIT_ROOT", dir.path())
        .env_remove("GOALKIT_PERSONA");
    cmd
}

fn init_project(dir: &TempDir) {
    goalkit(dir)
        .args(["init", "--name", "demo"])
        .assert()
        .success();
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn ready_vision(dir: &TempDir) {
    goalkit(dir)
        .args([
            "vision",
            "task app for teams",
            "--answer",
            "Q1=A",
            "--answer",
            "Q2=A",
            "--answer",
            "Q3=A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready"));
}

fn ready_goal(dir: &TempDir) {
    goalkit(dir)
        .args([
            "goal",
            "Teams plan their week in under 10 minutes",
            "--answer",
            "Q1=A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("001-teams-plan-their-week"));
}

// ---------------------------------------------------------------------------
// goalkit init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_directory_tree() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    assert!(dir.path().join(".goalkit/config.yaml").exists());
    assert!(dir.path().join(".goalkit/state.yaml").exists());
    assert!(dir.path().join(".goalkit/vision").is_dir());
    assert!(dir.path().join(".goalkit/goals").is_dir());
    assert!(dir.path().join(".goalkit/coordination").is_dir());
    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.contains(".goalkit/webhooks.yaml"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    goalkit(&dir)
        .args(["vision", "task app for teams"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// generation and clarification
// ---------------------------------------------------------------------------

#[test]
fn empty_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .arg("vision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input provided"));
    assert!(!dir.path().join(".goalkit/vision/vision.md").exists());
}

#[test]
fn goal_without_vision_names_missing_command() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .args(["goal", "Teams plan their week"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "vision not found, run /goalkit.vision first",
        ));
    let entries = std::fs::read_dir(dir.path().join(".goalkit/goals"))
        .unwrap()
        .count();
    assert_eq!(entries, 0);
}

#[test]
fn vision_asks_at_most_three_questions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let out = json_output(goalkit(&dir).args(["vision", "task app for teams", "--no-input"]));
    assert_eq!(out["state"], "clarification_pending");
    let questions = out["questions"].as_array().unwrap();
    assert!(!questions.is_empty() && questions.len() <= 3);
    assert!(questions.iter().all(|q| q["section"] != "platform"));
    assert!(questions.iter().all(|q| q["impact"] != "implementation"));

    let draft = std::fs::read_to_string(dir.path().join(".goalkit/vision/vision.md")).unwrap();
    assert!(draft.matches("[NEEDS CLARIFICATION").count() <= 3);
}

#[test]
fn answer_resumes_pending_vision() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .args(["vision", "task app for teams", "--no-input"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Q1"));

    goalkit(&dir)
        .args(["answer", "vision", "Q1=A", "Q2=B", "Q3=C"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready"))
        .stdout(predicate::str::contains("Next: /goalkit.goal"));

    let doc = std::fs::read_to_string(dir.path().join(".goalkit/vision/vision.md")).unwrap();
    assert!(!doc.contains("NEEDS CLARIFICATION"));
    assert!(dir
        .path()
        .join(".goalkit/vision/checklists/vision.md")
        .exists());

    goalkit(&dir)
        .args(["answer", "vision", "Q1=A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no pending clarification questions"));
}

#[test]
fn partial_answers_name_the_missing_questions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .args(["vision", "task app for teams", "--no-input"])
        .assert()
        .success();

    goalkit(&dir)
        .args(["answer", "vision", "Q1=A"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "unanswered clarification questions: Q2, Q3",
        ));

    goalkit(&dir)
        .args(["answer", "vision", "Q1=A", "Q2=A", "Q3=A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready"));
}

#[test]
fn finalized_artifact_is_not_regenerated() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    ready_vision(&dir);
    goalkit(&dir)
        .args(["vision", "something else entirely"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already finalized"));
}

#[test]
fn revalidating_ready_vision_changes_nothing() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    ready_vision(&dir);

    let path = dir.path().join(".goalkit/vision/vision.md");
    let before = std::fs::read(&path).unwrap();
    let out = json_output(goalkit(&dir).args(["validate", "vision"]));
    assert_eq!(out["state"], "ready");
    assert_eq!(out["changed"], false);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn revalidating_corrected_vision_changes_nothing() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .args([
            "vision",
            "Task app for teams. Built with React.",
            "--answer",
            "Q1=A",
            "--answer",
            "Q2=A",
            "--answer",
            "Q3=A",
        ])
        .assert()
        .success();

    let checklist = dir.path().join(".goalkit/vision/checklists/vision.md");
    let state = dir.path().join(".goalkit/state.yaml");
    let before = (std::fs::read(&checklist).unwrap(), std::fs::read(&state).unwrap());
    let out = json_output(goalkit(&dir).args(["validate", "vision"]));
    assert_eq!(out["changed"], false);
    assert_eq!(out["correction_attempts"], 1);
    assert_eq!(std::fs::read(&checklist).unwrap(), before.0);
    assert_eq!(std::fs::read(&state).unwrap(), before.1);
}

#[test]
fn checklist_is_printed() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    ready_vision(&dir);
    goalkit(&dir)
        .args(["checklist", "vision"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Vision Quality Checklist"))
        .stdout(predicate::str::contains("- [x]"));
}

// ---------------------------------------------------------------------------
// goal chain and progress
// ---------------------------------------------------------------------------

#[test]
fn goal_chain_records_milestones() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    ready_vision(&dir);
    ready_goal(&dir);

    let goal_doc = std::fs::read_to_string(
        dir.path()
            .join(".goalkit/goals/001-teams-plan-their-week/goal.md"),
    )
    .unwrap();
    assert!(goal_doc.contains(".goalkit/vision/vision.md"));

    goalkit(&dir)
        .args([
            "strategies",
            "--goal",
            "1",
            "Start narrow with a weekly planning view",
            "--answer",
            "Q1=A",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next: /goalkit.milestones"));

    goalkit(&dir)
        .args([
            "milestones",
            "--goal",
            "1",
            "Ship the planner in stages\nMilestones: Foundation; Beta (due 2026-11-01)\nReview: weekly check of planning time",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready"));

    let progress = json_output(goalkit(&dir).args(["progress", "show", "1"]));
    assert_eq!(progress["summary"]["total"], 2);
    assert_eq!(progress["milestones"][1]["due"], "2026-11-01");

    goalkit(&dir)
        .args(["progress", "complete", "1", "M1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed M1"))
        .stdout(predicate::str::contains("1/2 (50%)"));

    let check = json_output(goalkit(&dir).args(["progress", "check", "--today", "2026-10-30"]));
    assert_eq!(check.as_array().unwrap().len(), 1);
    assert_eq!(check[0]["kind"], "deadline_approaching");

    goalkit(&dir)
        .args(["progress", "complete", "1", "M9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("milestone not found"));
}

#[test]
fn goal_scoped_command_needs_known_goal() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    ready_vision(&dir);
    goalkit(&dir)
        .args(["strategies", "--goal", "missing", "Start narrow"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("goal not found: missing"));
}

#[test]
fn status_and_goal_listing() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let status = json_output(goalkit(&dir).arg("status"));
    assert_eq!(status["next_command"], "/goalkit.vision");

    ready_vision(&dir);
    ready_goal(&dir);

    let status = json_output(goalkit(&dir).arg("status"));
    assert_eq!(
        status["next_command"],
        "/goalkit.strategies --goal 001-teams-plan-their-week"
    );

    goalkit(&dir)
        .args(["goals", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("001-teams-plan-their-week"));

    goalkit(&dir)
        .args(["goals", "show", "teams-plan-their-week"])
        .assert()
        .success()
        .stdout(predicate::str::contains("goal.md"));
}

#[test]
fn setup_prints_path_contract() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    ready_vision(&dir);
    ready_goal(&dir);

    let output = goalkit(&dir)
        .args(["setup", "milestones", "--goal", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["GOAL_DIR"], ".goalkit/goals/001-teams-plan-their-week");
    assert_eq!(json["BRANCH_NAME"], "001-teams-plan-their-week");
    assert_eq!(
        json["MILESTONES_FILE"],
        ".goalkit/goals/001-teams-plan-their-week/milestones.md"
    );
    assert!(json["CHECKLIST_FILE"].is_string());
}

// ---------------------------------------------------------------------------
// webhooks, config, risk
// ---------------------------------------------------------------------------

#[test]
fn webhook_add_list_remove() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let hook = json_output(goalkit(&dir).args([
        "webhook",
        "add",
        "https://example.com/hook",
        "--event",
        "task_completed",
        "--secret",
        "s3cret",
    ]));
    let id = hook["id"].as_str().unwrap().to_string();
    assert_eq!(hook["events"][0], "task_completed");

    goalkit(&dir)
        .args(["webhook", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/hook"))
        .stdout(predicate::str::contains("active"));

    goalkit(&dir)
        .args(["webhook", "remove", &id])
        .assert()
        .success();

    goalkit(&dir)
        .args(["webhook", "add", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid webhook url"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));

    let path = dir.path().join(".goalkit/config.yaml");
    std::fs::write(
        &path,
        "project:\n  name: demo\nclarification:\n  max_questions: 5\nwebhooks:\n  failure_threshold: 0\n",
    )
    .unwrap();
    goalkit(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[warning] clarification.max_questions=5"))
        .stdout(predicate::str::contains("[error] webhooks.failure_threshold"));
}

#[test]
fn risk_table_lookup() {
    let dir = TempDir::new().unwrap();
    let out = json_output(goalkit(&dir).args(["risk", "critical"]));
    assert_eq!(out["level"], "critical");
    assert_eq!(out["pause_new_work"], true);
    assert_eq!(out["notify"], true);

    goalkit(&dir)
        .args(["risk", "extreme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid risk level"));
}

#[test]
fn unknown_kind_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    goalkit(&dir)
        .args(["validate", "roadmap"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown artifact kind"));
}
