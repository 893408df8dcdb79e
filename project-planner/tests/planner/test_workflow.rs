//! File-based workflow: loading inputs, prompt overrides and saved output

use super::common::*;
use clap::Parser;
use project_planner::planner::cli::Args;
use project_planner::planner::types::ProjectPlan;
use project_planner::planner::{run_planning_workflow, WorkflowConfig};
use std::path::Path;

fn config_for(dir: &Path, extra: &[&str]) -> WorkflowConfig {
    let team = dir.join("team.json");
    let output = dir.join("out").join("plan.json");
    let mut argv = vec![
        "project-planner".to_string(),
        "--team".to_string(),
        team.display().to_string(),
        "--output".to_string(),
        output.display().to_string(),
        "--start-date".to_string(),
        "2025-03-03".to_string(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));

    let args = Args::try_parse_from(argv).unwrap();
    args.validate().unwrap();
    WorkflowConfig::from(args)
}

fn write_team(dir: &Path) {
    std::fs::write(dir.join("team.json"), sample_team().to_string()).unwrap();
}

#[tokio::test]
async fn test_workflow_writes_json_plan() {
    let dir = tempfile::tempdir().unwrap();
    write_team(dir.path());
    let config = config_for(dir.path(), &[LANDING_PAGE_INTENT]);
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());

    let run = run_planning_workflow(&provider, &config).await.unwrap();

    let written = std::fs::read_to_string(&config.output_path).unwrap();
    let saved: ProjectPlan = serde_json::from_str(&written).unwrap();
    assert_eq!(saved, run.plan);
    assert!(written.contains("\"start_date\": \"2025-03-03\""));
}

#[tokio::test]
async fn test_workflow_reads_input_file_and_writes_yaml() {
    let dir = tempfile::tempdir().unwrap();
    write_team(dir.path());
    let input = dir.path().join("idea.txt");
    std::fs::write(&input, "Build a landing page\nfor the anvil catalog\n").unwrap();
    let yaml_out = dir.path().join("plan.yaml");

    let mut config = config_for(dir.path(), &["--input", input.to_str().unwrap(), "--format", "yaml"]);
    config.output_path = yaml_out.clone();
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());

    run_planning_workflow(&provider, &config).await.unwrap();

    let requests = provider.requests();
    assert!(requests[0]
        .user
        .contains("Build a landing page for the anvil catalog"));
    let written = std::fs::read_to_string(&yaml_out).unwrap();
    assert!(written.contains("organization: Acme"));
}

#[tokio::test]
async fn test_prompt_directory_overrides_templates() {
    let dir = tempfile::tempdir().unwrap();
    write_team(dir.path());
    let prompts = dir.path().join("prompts");
    std::fs::create_dir(&prompts).unwrap();
    std::fs::write(
        prompts.join("project_details_prompt.txt"),
        "CUSTOM: {project_description}",
    )
    .unwrap();

    let config = config_for(
        dir.path(),
        &[LANDING_PAGE_INTENT, "--prompts-dir", prompts.to_str().unwrap()],
    );
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());

    run_planning_workflow(&provider, &config).await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests[0].user, "CUSTOM: Build a landing page");
    // templates without an override file keep the built-in text
    assert!(requests[1].user.contains("Acme Landing Page"));
}

#[tokio::test]
async fn test_failed_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_team(dir.path());
    let config = config_for(dir.path(), &[LANDING_PAGE_INTENT]);
    let tasks = tasks_reply(vec![task("T1", "Develop page", "Carol", 8, &[], "Build")]);
    let provider = ScriptedProvider::replying(&details_reply(), &tasks);

    let err = run_planning_workflow(&provider, &config).await.unwrap_err();

    assert!(err.to_string().contains("stage 3 (Task Generation)"));
    assert!(!config.output_path.exists());
}

#[tokio::test]
async fn test_missing_team_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path(), &[LANDING_PAGE_INTENT]);
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());

    let err = run_planning_workflow(&provider, &config).await.unwrap_err();

    assert!(format!("{:#}", err).contains("team.json"));
    assert!(provider.requests().is_empty());
}
