//! Stage 2: Generate project details
//!
//! Asks the model for a title, description, objectives and roadmap, then
//! validates the reply. Provider failures and malformed replies surface as
//! different error kinds so the caller can tell retryable from structural.

use std::collections::HashSet;

use crate::planner::config::ModelSettings;
use crate::planner::error::{PlanError, PlanResult, Stage};
use crate::planner::prompts::PromptTemplates;
use crate::planner::step1_preprocess::normalize_whitespace;
use crate::planner::types::{PreprocessedInput, ProjectDetails};
use crate::workflow_utils::{execute_model_call, parse_json, preview, CallStats, ModelProvider};
use project_planner_sdk::{log_found, log_info, log_stats};

pub async fn generate_project_details(
    provider: &dyn ModelProvider,
    settings: &ModelSettings,
    templates: &PromptTemplates,
    input: &PreprocessedInput,
) -> PlanResult<(ProjectDetails, CallStats)> {
    let request = settings.request(
        templates.render_system(input),
        templates.render_project_details(input),
    );

    log_info!("Querying {} for project details...", settings.model);
    let (response, stats) =
        execute_model_call(Stage::ProjectDetails.number(), provider, &request).await?;

    if let Some(usage) = stats.usage {
        log_stats!(stats.duration_ms, stats.model, usage.input_tokens, usage.output_tokens);
    }

    let details = parse_project_details(&response)?;
    log_found!(details.objectives.len(), "objectives");
    log_found!(details.roadmap.len(), "roadmap phases");

    Ok((details, stats))
}

/// Parse and validate a project-details reply
pub fn parse_project_details(response: &str) -> PlanResult<ProjectDetails> {
    let details: ProjectDetails = parse_json(response).map_err(|e| {
        PlanError::schema(format!(
            "project details reply is not valid: {} (reply: {})",
            e,
            preview(response, 200)
        ))
    })?;

    let details = normalize_details(details);
    validate_project_details(&details)?;
    Ok(details)
}

fn normalize_details(mut details: ProjectDetails) -> ProjectDetails {
    details.title = normalize_whitespace(&details.title);
    details.description = details.description.trim().to_string();
    details.summary = details.summary.trim().to_string();
    for objective in &mut details.objectives {
        objective.objective = normalize_whitespace(&objective.objective);
    }
    for phase in &mut details.roadmap {
        phase.name = normalize_whitespace(&phase.name);
    }
    details
}

/// Check the shape contract for [`ProjectDetails`]
pub fn validate_project_details(details: &ProjectDetails) -> PlanResult<()> {
    if details.title.is_empty() {
        return Err(PlanError::schema("project details have no title"));
    }
    if details.objectives.is_empty() {
        return Err(PlanError::schema("project details have no objectives"));
    }
    if details.objectives.iter().any(|o| o.objective.is_empty()) {
        return Err(PlanError::schema("an objective is empty"));
    }
    if details.roadmap.is_empty() {
        return Err(PlanError::schema("project details have an empty roadmap"));
    }

    let mut names = HashSet::new();
    for phase in &details.roadmap {
        if phase.name.is_empty() {
            return Err(PlanError::schema("a roadmap phase has no name"));
        }
        if !names.insert(phase.name.to_lowercase()) {
            return Err(PlanError::schema(format!(
                "duplicate roadmap phase '{}'",
                phase.name
            )));
        }
    }

    Ok(())
}
