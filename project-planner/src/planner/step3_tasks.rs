//! Stage 3: Generate and validate tasks
//!
//! Expands the roadmap into tasks via the model, then checks the batch
//! locally: ids are unique, every assignee is on the roster, every
//! dependency points at a task in the same batch, and the dependency
//! relation is acyclic.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::planner::config::ModelSettings;
use crate::planner::dependency_graph::DependencyGraph;
use crate::planner::error::{PlanError, PlanResult, Stage};
use crate::planner::prompts::PromptTemplates;
use crate::planner::step1_preprocess::normalize_whitespace;
use crate::planner::types::{
    same_name, Phase, PreprocessedInput, Priority, ProjectDetails, Roster, Task, TaskTag,
};
use crate::workflow_utils::{
    execute_model_call, extract_json, preview, unwrap_array, CallStats, ModelProvider,
};
use project_planner_sdk::{log_found, log_info, log_stats, log_warning};

/// Keyword table for task categorization, checked in order
const TAG_KEYWORDS: &[(TaskTag, &[&str])] = &[
    (
        TaskTag::Meeting,
        &[
            "meeting",
            "workshop",
            "review",
            "coordination",
            "session",
            "interview",
            "recruitment",
            "presentation",
        ],
    ),
    (
        TaskTag::Research,
        &["research", "analysis", "study", "investigation", "exploration"],
    ),
    (
        TaskTag::Design,
        &["design", "wireframing", "prototype", "blueprint", "architecture", "schema"],
    ),
    (
        TaskTag::Development,
        &["development", "implementation", "integration", "creation", "building"],
    ),
    (
        TaskTag::Testing,
        &["testing", "benchmarking", "audit", "assessment", "evaluation"],
    ),
    (TaskTag::Documentation, &["documentation", "guide", "manual"]),
    (TaskTag::Marketing, &["marketing", "sales", "demo", "collateral"]),
];

/// Largest estimate accepted for one task (five working years at 8h/day)
pub const MAX_ESTIMATED_HOURS: u32 = 10_000;

/// Task record as the model writes it
#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default, alias = "task_id")]
    id: Option<Value>,

    #[serde(alias = "task_name", alias = "name")]
    title: String,

    #[serde(default)]
    description: String,

    #[serde(default)]
    assignee: String,

    #[serde(default)]
    dependencies: Vec<Value>,

    #[serde(alias = "estimated_duration", alias = "hours")]
    estimated_hours: f64,

    #[serde(default)]
    priority: Option<String>,

    #[serde(default)]
    phase: Option<String>,
}

pub async fn generate_tasks(
    provider: &dyn ModelProvider,
    settings: &ModelSettings,
    templates: &PromptTemplates,
    input: &PreprocessedInput,
    details: &ProjectDetails,
) -> PlanResult<(Vec<Task>, CallStats)> {
    let request = settings.request(
        templates.render_system(input),
        templates.render_tasks(input, details),
    );

    log_info!("Querying {} for tasks...", settings.model);
    let (response, stats) = execute_model_call(Stage::Tasks.number(), provider, &request).await?;

    if let Some(usage) = stats.usage {
        log_stats!(stats.duration_ms, stats.model, usage.input_tokens, usage.output_tokens);
    }

    let tasks = parse_tasks(&response, &input.roster, &details.roadmap)?;
    log_found!(tasks.len(), "tasks");

    Ok((tasks, stats))
}

/// Parse a task-list reply, normalize it and validate it against the roster
pub fn parse_tasks(response: &str, roster: &Roster, roadmap: &[Phase]) -> PlanResult<Vec<Task>> {
    let value: Value = serde_json::from_str(&extract_json(response)).map_err(|e| {
        PlanError::schema(format!(
            "task reply is not valid JSON: {} (reply: {})",
            e,
            preview(response, 200)
        ))
    })?;

    let items = unwrap_array(value, "tasks")
        .ok_or_else(|| PlanError::schema("task reply is neither an array nor a 'tasks' object"))?;
    if items.is_empty() {
        return Err(PlanError::schema("task reply contains no tasks"));
    }

    let raw: Vec<RawTask> = items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item)
                .map_err(|e| PlanError::schema(format!("task #{} is malformed: {}", idx + 1, e)))
        })
        .collect::<PlanResult<_>>()?;

    let tasks = normalize_tasks(raw, roster, roadmap)?;
    validate_tasks(&tasks, roster)?;
    Ok(tasks)
}

fn normalize_tasks(raw: Vec<RawTask>, roster: &Roster, roadmap: &[Phase]) -> PlanResult<Vec<Task>> {
    let ids = assign_ids(&raw)?;
    let by_id: HashMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();

    let mut by_title: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, task) in raw.iter().enumerate() {
        by_title
            .entry(normalize_whitespace(&task.title).to_lowercase())
            .or_default()
            .push(idx);
    }

    // Exact id, then id ignoring case, then a unique title
    let resolve = |owner: &str, reference: &str| -> PlanResult<String> {
        if by_id.contains_key(reference) {
            return Ok(reference.to_string());
        }
        if let Some(id) = ids.iter().find(|id| same_name(id, reference)) {
            return Ok(id.clone());
        }
        match by_title
            .get(&normalize_whitespace(reference).to_lowercase())
            .map(Vec::as_slice)
        {
            Some([idx]) => Ok(ids[*idx].clone()),
            Some(matches) if !matches.is_empty() => Err(PlanError::schema(format!(
                "task '{}' depends on '{}', a title shared by tasks {}",
                owner,
                reference,
                matches
                    .iter()
                    .map(|&i| format!("'{}'", ids[i]))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
            _ => Err(PlanError::reference(format!(
                "task '{}' depends on unknown task '{}'",
                owner, reference
            ))),
        }
    };

    let mut tasks = Vec::with_capacity(raw.len());
    for (idx, task) in raw.into_iter().enumerate() {
        let id = ids[idx].clone();

        let title = normalize_whitespace(&task.title);
        if title.is_empty() {
            return Err(PlanError::schema(format!("task '{}' has no title", id)));
        }

        if !task.estimated_hours.is_finite() || task.estimated_hours <= 0.0 {
            return Err(PlanError::schema(format!(
                "task '{}' has a non-positive estimate ({})",
                id, task.estimated_hours
            )));
        }
        if task.estimated_hours > f64::from(MAX_ESTIMATED_HOURS) {
            return Err(PlanError::schema(format!(
                "task '{}' estimates {} hours, above the {} hour limit",
                id, task.estimated_hours, MAX_ESTIMATED_HOURS
            )));
        }
        let estimated_hours = task.estimated_hours.ceil() as u32;

        let assignee = match roster.find(&task.assignee) {
            Some(member) => member.name.clone(),
            None => {
                return Err(PlanError::reference(format!(
                    "task '{}' is assigned to '{}', who is not on the team",
                    id,
                    task.assignee.trim()
                )))
            }
        };

        let mut dependencies: Vec<String> = Vec::new();
        for dep in &task.dependencies {
            let reference = reference_text(dep).ok_or_else(|| {
                PlanError::schema(format!(
                    "task '{}' has a malformed dependency entry: {}",
                    id, dep
                ))
            })?;
            let resolved = resolve(&id, &reference)?;
            if !dependencies.contains(&resolved) {
                dependencies.push(resolved);
            }
        }

        let priority = match task.priority.as_deref() {
            None => Priority::default(),
            Some(p) => Priority::parse(p).unwrap_or_else(|| {
                log_warning!("Task {} has unknown priority '{}', using Medium", id, p);
                Priority::default()
            }),
        };

        let phase = task
            .phase
            .map(|p| normalize_whitespace(&p))
            .filter(|p| !p.is_empty())
            .map(|p| match roadmap.iter().find(|r| same_name(&r.name, &p)) {
                Some(r) => r.name.clone(),
                None => {
                    log_warning!("Task {} names phase '{}', which is not on the roadmap", id, p);
                    p
                }
            });

        let description = task.description.trim().to_string();
        let tag = categorize(&title, &description);

        tasks.push(Task {
            id,
            title,
            description,
            assignee,
            dependencies,
            estimated_hours,
            priority,
            phase,
            tag,
        });
    }

    Ok(tasks)
}

/// Keep explicit ids and give the rest `TASK-NNN` by position, skipping
/// numbers another task already claimed
fn assign_ids(raw: &[RawTask]) -> PlanResult<Vec<String>> {
    let explicit: Vec<Option<String>> = raw
        .iter()
        .map(|task| task.id.as_ref().and_then(reference_text))
        .collect();

    let mut taken: HashSet<String> = HashSet::with_capacity(raw.len());
    for id in explicit.iter().flatten() {
        if !taken.insert(id.clone()) {
            return Err(PlanError::schema(format!("duplicate task id '{}'", id)));
        }
    }

    let mut next = 0usize;
    let mut ids = Vec::with_capacity(raw.len());
    for (idx, id) in explicit.into_iter().enumerate() {
        let id = match id {
            Some(id) => id,
            None => {
                next = next.max(idx + 1);
                loop {
                    let candidate = format!("TASK-{:03}", next);
                    next += 1;
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                }
            }
        };
        ids.push(id);
    }
    Ok(ids)
}

/// Check roster references, dependency references and acyclicity
pub fn validate_tasks(tasks: &[Task], roster: &Roster) -> PlanResult<()> {
    for task in tasks {
        if !roster.contains(&task.assignee) {
            return Err(PlanError::reference(format!(
                "task '{}' is assigned to '{}', who is not on the team",
                task.id, task.assignee
            )));
        }
    }

    let graph = DependencyGraph::build(tasks)?;
    graph.ensure_acyclic()?;
    debug!("Dependency graph over {} tasks is acyclic", graph.len());
    Ok(())
}

/// Pick the first category whose keyword appears in the title or description
pub fn categorize(title: &str, description: &str) -> TaskTag {
    let title = title.to_lowercase();
    let description = description.to_lowercase();

    TAG_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords
                .iter()
                .any(|k| title.contains(k) || description.contains(k))
        })
        .map(|(tag, _)| *tag)
        .unwrap_or(TaskTag::Other)
}

/// Ids and dependency references may arrive as strings or numbers
fn reference_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
