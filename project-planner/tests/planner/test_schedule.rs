//! Schedule invariants on plans produced by the full pipeline

use super::common::*;
use chrono::{Datelike, NaiveDate, Weekday};
use project_planner::planner::config::PipelineConfig;
use project_planner::planner::run_pipeline;
use project_planner::planner::types::ProjectPlan;
use std::collections::HashMap;

/// Fan-out/fan-in graph with several tasks per person
fn busy_tasks() -> String {
    tasks_reply(vec![
        task("K", "Kickoff meeting", "Alice", 2, &[], "Design"),
        task("R", "Research competitors", "Bob", 12, &["K"], "Design"),
        task("M", "Design mockups", "Bob", 20, &["R"], "Design"),
        task("API", "Develop backend api", "Alice", 30, &["K"], "Build"),
        task("UI", "Develop frontend", "Alice", 16, &["M"], "Build"),
        task("DOC", "Write user guide", "Bob", 6, &["M"], "Build"),
        task("QA", "Testing pass", "Alice", 10, &["API", "UI"], "Launch"),
        task("GO", "Launch", "Bob", 4, &["QA", "DOC"], "Launch"),
    ])
}

async fn plan_with(config: &PipelineConfig) -> ProjectPlan {
    let provider = ScriptedProvider::replying(&details_reply(), &busy_tasks());
    run_pipeline(&provider, config, LANDING_PAGE_INTENT, &sample_team())
        .await
        .unwrap()
        .plan
}

fn assert_dependencies_finish_first(plan: &ProjectPlan) {
    let by_id: HashMap<&str, _> = plan
        .tasks
        .iter()
        .map(|t| (t.task.id.as_str(), t))
        .collect();
    for t in &plan.tasks {
        assert!(t.start_date <= t.end_date, "{} has an inverted interval", t.task.id);
        for dep in &t.task.dependencies {
            let d = by_id[dep.as_str()];
            assert!(
                d.end_date < t.start_date,
                "{} starts {} before {} ends {}",
                t.task.id,
                t.start_date,
                dep,
                d.end_date
            );
        }
    }
}

fn assert_no_double_booking(plan: &ProjectPlan) {
    for (i, a) in plan.tasks.iter().enumerate() {
        for b in &plan.tasks[i + 1..] {
            if a.task.assignee == b.task.assignee {
                assert!(!a.overlaps(b), "{} overlaps {}", a.task.id, b.task.id);
            }
        }
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[tokio::test]
async fn test_weekday_schedule_invariants() {
    let plan = plan_with(&pipeline_config()).await;

    assert_dependencies_finish_first(&plan);
    assert_no_double_booking(&plan);
    for t in &plan.tasks {
        assert!(!is_weekend(t.start_date), "{} starts on a weekend", t.task.id);
        assert!(!is_weekend(t.end_date), "{} ends on a weekend", t.task.id);
    }
    assert_eq!(plan.analytics.timeline.start_date, start_date());
}

#[tokio::test]
async fn test_calendar_day_schedule_invariants() {
    let mut config = pipeline_config();
    config.schedule.skip_weekends = false;
    config.schedule.hours_per_day = 6;
    let plan = plan_with(&config).await;

    assert_dependencies_finish_first(&plan);
    assert_no_double_booking(&plan);
}

#[tokio::test]
async fn test_double_booking_only_relaxes_overlap() {
    let mut config = pipeline_config();
    config.schedule.allow_double_booking = true;
    let relaxed = plan_with(&config).await;
    let strict = plan_with(&pipeline_config()).await;

    assert_dependencies_finish_first(&relaxed);
    assert!(relaxed.analytics.timeline.end_date <= strict.analytics.timeline.end_date);
}

#[tokio::test]
async fn test_output_order_and_analytics_totals() {
    let plan = plan_with(&pipeline_config()).await;

    let ids: Vec<&str> = plan.tasks.iter().map(|t| t.task.id.as_str()).collect();
    assert_eq!(ids, vec!["K", "R", "M", "API", "UI", "DOC", "QA", "GO"]);

    let hours: u64 = plan.analytics.workload.values().map(|w| w.estimated_hours).sum();
    assert_eq!(hours, plan.analytics.total_estimated_hours);
    assert_eq!(hours, 100);

    let tagged: usize = plan.analytics.tags.values().map(|t| t.count).sum();
    assert_eq!(tagged, plan.tasks.len());

    let path = &plan.analytics.critical_path;
    assert_eq!(path.last().map(String::as_str), Some("GO"));
    assert_eq!(path.first().map(String::as_str), Some("K"));
}
