//! Main workflow orchestration for the project planner.
//!
//! This module coordinates the five stages:
//! 1. Preprocess the request and team context
//! 2. Generate project details (model call)
//! 3. Generate and validate tasks (model call)
//! 4. Schedule tasks on the calendar
//! 5. Aggregate the plan and analytics
//!
//! [`run_pipeline`] is the pure pipeline over any [`ModelProvider`];
//! [`run_planning_workflow`] adds file loading and saving around it.

use anyhow::{Context, Result};
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::planner::{
    cli::{Args, OutputFormat},
    config::{ModelSettings, PipelineConfig, ScheduleOptions},
    error::{PipelineError, PlanResult, Stage},
    prompts::PromptTemplates,
    step1_preprocess::preprocess,
    step2_details::generate_project_details,
    step3_tasks::generate_tasks,
    step4_calendar::generate_calendar,
    step5_output::aggregate_plan,
    types::{PlanRun, ProjectPlan},
    utils::{load_team_context, load_user_input, save_document},
};
use crate::workflow_utils::{CallStats, ModelProvider, OpenAiProvider};
use project_planner_sdk::{
    log_debug, log_error, log_file_saved, log_info, log_plan_written, log_run_finish, log_run_start,
    log_stage_complete, log_stage_complete_console, log_stage_failed, log_stage_start,
    log_stage_start_console, RunStatus,
};

/// Workflow configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Inline project description
    pub description: Option<String>,

    /// File holding the project description
    pub input_path: Option<PathBuf>,

    /// Team context file (JSON or YAML)
    pub team_path: PathBuf,

    /// Where the plan is written
    pub output_path: PathBuf,

    pub format: OutputFormat,

    /// Optional prompt template overrides
    pub prompts_dir: Option<PathBuf>,

    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,

    /// Enable debug output
    pub debug: bool,

    /// Stage settings; prompts are replaced from `prompts_dir` at run time
    pub pipeline: PipelineConfig,
}

impl From<Args> for WorkflowConfig {
    fn from(args: Args) -> Self {
        let output_path = args
            .output
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("project_plan.{}", args.format.extension())));

        let mut schedule = args
            .start_date
            .map(ScheduleOptions::starting)
            .unwrap_or_default();
        schedule.hours_per_day = args.hours_per_day;
        schedule.skip_weekends = !args.include_weekends;
        schedule.allow_double_booking = args.allow_double_booking;

        WorkflowConfig {
            description: args.description,
            input_path: args.input.map(PathBuf::from),
            team_path: PathBuf::from(args.team),
            output_path,
            format: args.format,
            prompts_dir: args.prompts_dir.map(PathBuf::from),
            api_key: args.api_key,
            base_url: args.base_url,
            timeout: Duration::from_secs(args.timeout_secs),
            debug: args.debug,
            pipeline: PipelineConfig {
                details_model: ModelSettings::new(args.details_model, args.temperature),
                tasks_model: ModelSettings::new(args.tasks_model, args.temperature),
                schedule,
                prompts: PromptTemplates::default(),
            },
        }
    }
}

/// Run the five stages against `provider`
///
/// Stops at the first failing stage and reports it in the returned
/// [`PipelineError`]. Nothing is written to disk.
pub async fn run_pipeline(
    provider: &dyn ModelProvider,
    config: &PipelineConfig,
    user_intent: &str,
    raw_team: &Value,
) -> Result<PlanRun, PipelineError> {
    let run_id = Uuid::new_v4();
    let started = Instant::now();
    log_run_start!(run_id, Stage::ALL.len());

    let mut model_calls = Vec::new();
    let result = execute_stages(provider, config, user_intent, raw_team, &mut model_calls).await;

    let duration_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(plan) => {
            log_run_finish!(run_id, RunStatus::Completed, duration_ms);
            Ok(PlanRun {
                run_id,
                plan,
                model_calls,
                duration_ms,
            })
        }
        Err(e) => {
            log_run_finish!(run_id, RunStatus::Failed, duration_ms);
            Err(e)
        }
    }
}

async fn execute_stages(
    provider: &dyn ModelProvider,
    config: &PipelineConfig,
    user_intent: &str,
    raw_team: &Value,
    model_calls: &mut Vec<CallStats>,
) -> Result<ProjectPlan, PipelineError> {
    let input = run_stage(
        Stage::Preprocess,
        "Normalize the request and team roster",
        async { preprocess(user_intent, raw_team) },
    )
    .await?;

    let (details, stats) = run_stage(
        Stage::ProjectDetails,
        "Generate title, objectives and roadmap",
        generate_project_details(provider, &config.details_model, &config.prompts, &input),
    )
    .await?;
    model_calls.push(stats);

    let (tasks, stats) = run_stage(
        Stage::Tasks,
        "Generate tasks with assignees and dependencies",
        generate_tasks(provider, &config.tasks_model, &config.prompts, &input, &details),
    )
    .await?;
    model_calls.push(stats);

    let scheduled = run_stage(
        Stage::Calendar,
        "Place tasks on the working calendar",
        async { generate_calendar(&tasks, &input.roster, &config.schedule) },
    )
    .await?;

    run_stage(
        Stage::Output,
        "Aggregate plan and analytics",
        async { aggregate_plan(&input.organization.name, &details, &scheduled) },
    )
    .await
}

/// Run one stage with console and structured logging
async fn run_stage<T>(
    stage: Stage,
    description: &str,
    work: impl Future<Output = PlanResult<T>>,
) -> Result<T, PipelineError> {
    let number = stage.number();
    log_stage_start_console!(number, stage.name(), description);
    log_stage_start!(number, stage.name(), Stage::ALL.len());

    match work.await {
        Ok(value) => {
            log_stage_complete!(number, stage.name());
            log_stage_complete_console!(number);
            Ok(value)
        }
        Err(error) => {
            log_stage_failed!(number, stage.name(), error.kind(), &error);
            Err(PipelineError::new(stage, error))
        }
    }
}

/// Load inputs, run the pipeline and save the plan
pub async fn run_planning_workflow(
    provider: &dyn ModelProvider,
    config: &WorkflowConfig,
) -> Result<PlanRun> {
    let mut pipeline = config.pipeline.clone();
    if let Some(dir) = &config.prompts_dir {
        pipeline.prompts = PromptTemplates::load_from_dir(dir)?;
    }

    let user_intent = match (&config.description, &config.input_path) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => load_user_input(path)?,
        (None, None) => anyhow::bail!("No project description given"),
    };

    log_info!("Loading team context from {}", config.team_path.display());
    let team = load_team_context(&config.team_path)?;

    if config.debug {
        log_debug!("Schedule options: {:?}", pipeline.schedule);
        log_debug!(
            "Models: details={} tasks={}",
            pipeline.details_model.model,
            pipeline.tasks_model.model
        );
    }

    let run = match run_pipeline(provider, &pipeline, &user_intent, &team).await {
        Ok(run) => run,
        Err(e) => {
            log_error!("{}", e);
            if e.is_retryable() {
                log_info!("This failure is transient; running again may succeed");
            }
            return Err(e.into());
        }
    };

    save_document(&run.plan, &config.output_path, config.format)?;
    log_file_saved!(config.output_path.display());
    log_plan_written!(config.output_path.display(), "Project plan");

    print_summary(&run);
    Ok(run)
}

fn print_summary(run: &PlanRun) {
    let analytics = &run.plan.analytics;

    println!("\n{}", "=".repeat(80));
    println!("Plan: {}", run.plan.details.title);
    println!("{}", "=".repeat(80));
    println!(
        "Tasks: {} ({} estimated hours)",
        analytics.total_tasks, analytics.total_estimated_hours
    );
    println!(
        "Timeline: {} to {} ({} days)",
        analytics.timeline.start_date, analytics.timeline.end_date, analytics.timeline.total_days
    );
    for (name, load) in &analytics.workload {
        println!("  {}: {} tasks, {}h", name, load.task_count, load.estimated_hours);
    }
    if !analytics.critical_path.is_empty() {
        println!("Critical path: {}", analytics.critical_path.join(" -> "));
    }
    println!("Run {} finished in {}ms", run.run_id, run.duration_ms);
}

/// Entry point for the binary
pub async fn run_workflow(args: Args) -> Result<()> {
    args.validate()?;
    let config = WorkflowConfig::from(args);

    let api_key = config
        .api_key
        .clone()
        .context("OPENAI_API_KEY is not set (export it, add it to .env, or pass --api-key)")?;
    let provider = OpenAiProvider::new(api_key, config.base_url.clone(), config.timeout)
        .context("Failed to create model provider")?;

    run_planning_workflow(&provider, &config).await?;
    Ok(())
}
