//! End-to-end pipeline scenarios and error propagation

use super::common::*;
use project_planner::planner::{run_pipeline, ErrorKind, Stage};
use project_planner::workflow_utils::{ProviderError, ProviderErrorKind};
use serde_json::json;

#[tokio::test]
async fn test_landing_page_plan() {
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());

    let run = run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap();
    let plan = &run.plan;

    assert_eq!(plan.organization, "Acme");
    assert_eq!(plan.details.title, "Acme Landing Page");
    assert_eq!(plan.tasks.len(), 4);
    assert!(plan
        .tasks
        .iter()
        .all(|t| t.task.assignee == "Alice" || t.task.assignee == "Bob"));

    let assignees: Vec<&str> = plan.analytics.workload.keys().map(String::as_str).collect();
    assert_eq!(assignees, vec!["Alice", "Bob"]);
    assert_eq!(plan.analytics.workload["Alice"].estimated_hours, 32);
    assert_eq!(plan.analytics.total_estimated_hours, 56);
    assert_eq!(plan.analytics.phases["Design"], 2);
    assert_eq!(plan.analytics.critical_path, vec!["T1", "T2", "T4"]);

    assert_eq!(run.model_calls.len(), 2);
    assert_eq!(run.model_calls[0].usage.unwrap().input_tokens, 120);
}

#[tokio::test]
async fn test_prompts_carry_roster_and_details() {
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());
    run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.json_mode));
    assert!(requests[0].system.contains("Acme"));
    assert!(requests[0].system.contains("- Alice: Engineer"));
    assert!(requests[0].user.contains(LANDING_PAGE_INTENT));
    assert!(requests[1].user.contains("Acme Landing Page"));
    assert!(requests[1].user.contains("Launch"));
}

#[tokio::test]
async fn test_unknown_assignee_fails_with_reference_error() {
    let tasks = tasks_reply(vec![
        task("T1", "Design mockups", "Bob", 8, &[], "Design"),
        task("T2", "Develop page", "Carol", 8, &["T1"], "Build"),
    ]);
    let provider = ScriptedProvider::replying(&details_reply(), &tasks);

    let err = run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Tasks);
    assert_eq!(err.kind(), ErrorKind::Reference);
    assert!(err.to_string().contains("Carol"));
}

#[tokio::test]
async fn test_dependency_cycle_stops_before_calendar() {
    let tasks = tasks_reply(vec![
        task("A", "Design mockups", "Bob", 8, &["B"], "Design"),
        task("B", "Develop page", "Alice", 8, &["C"], "Build"),
        task("C", "Testing", "Alice", 8, &["A"], "Launch"),
    ]);
    let provider = ScriptedProvider::replying(&details_reply(), &tasks);

    let err = run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Tasks);
    assert_eq!(err.kind(), ErrorKind::Cycle);
    assert!(err.to_string().contains("A -> B -> C -> A"));
}

#[tokio::test]
async fn test_rate_limit_is_retryable_provider_error() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::from_status(
        429,
        "slow down",
    ))]);

    let err = run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::ProjectDetails);
    assert_eq!(err.kind(), ErrorKind::Provider);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_auth_failure_is_not_retryable() {
    let provider = ScriptedProvider::new(vec![
        Ok(details_reply()),
        Err(ProviderError::new(ProviderErrorKind::Auth, "bad key")),
    ]);

    let err = run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Tasks);
    assert_eq!(err.kind(), ErrorKind::Provider);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unparseable_details_is_schema_error() {
    let provider = ScriptedProvider::new(vec![Ok("Sure! Here is your plan.".to_string())]);

    let err = run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::ProjectDetails);
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_invalid_team_never_reaches_provider() {
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());
    let team = json!({"organization": {"name": "Acme"}, "team_members": []});

    let err = run_pipeline(&provider, &pipeline_config(), LANDING_PAGE_INTENT, &team)
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Preprocess);
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_empty_intent_is_validation_error() {
    let provider = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());
    let err = run_pipeline(&provider, &pipeline_config(), "   \n ", &sample_team())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_identical_input_gives_identical_plan() {
    let first = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());
    let second = ScriptedProvider::replying(&details_reply(), &landing_page_tasks());
    let config = pipeline_config();

    let a = run_pipeline(&first, &config, LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap();
    let b = run_pipeline(&second, &config, LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap();

    assert_eq!(a.plan, b.plan);
    assert_ne!(a.run_id, b.run_id);
}
