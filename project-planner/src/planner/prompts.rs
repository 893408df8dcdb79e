//! Prompt templates and rendering helpers.
//!
//! Templates use `{placeholder}` markers that are replaced literally, so the
//! JSON examples embedded in a template never need brace escaping.

use std::path::Path;

use anyhow::{Context, Result};

use crate::planner::types::{KeyPoint, Objective, Phase, PreprocessedInput, ProjectDetails, Roster};
use project_planner_sdk::log_info;

pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";
pub const PROJECT_DETAILS_PROMPT_FILE: &str = "project_details_prompt.txt";
pub const TASKS_PROMPT_FILE: &str = "tasks_prompt.txt";

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an experienced project manager working for {organization_name}.

Organization: {organization_name}
Industry: {organization_industry}
About: {organization_about}
Team context: {team_context}

Team members:
{team_members}

You plan realistic projects for this exact team. Only assign work to the team members listed above, using their names exactly as written.

Always answer with a single valid JSON object and nothing else."#;

const DEFAULT_PROJECT_DETAILS_PROMPT: &str = r#"Analyze the following project request and produce the project details.

# Project request
{project_description}

Respond with a JSON object of this exact shape:
{
  "title": "short project title",
  "description": "two or three sentence description of the project",
  "summary": "brief analysis of what the request involves",
  "objectives": [
    {"objective": "measurable objective", "description": "why it matters"}
  ],
  "key_points": [
    {"key_point": "important consideration", "description": "details"}
  ],
  "roadmap": [
    {"name": "phase name", "description": "what happens in this phase"}
  ]
}

Requirements:
- at least one objective
- at least one roadmap phase, in execution order, each with a unique name"#;

const DEFAULT_TASKS_PROMPT: &str = r#"Break the project below into concrete tasks for the team.

# Project
Title: {project_title}
Description: {project_description}
Original request: {original_request}
Summary: {project_summary}

# Roadmap
{roadmap}
# Objectives
{objectives}
# Key points
{key_points}
# Team members
{team_members}

Respond with a JSON object of this exact shape:
{
  "tasks": [
    {
      "id": "TASK-001",
      "title": "task title",
      "description": "what needs to be done",
      "assignee": "exact team member name",
      "dependencies": ["TASK-000"],
      "estimated_hours": 8,
      "priority": "Low | Medium | High | Critical",
      "phase": "roadmap phase name"
    }
  ]
}

Requirements:
- ids are unique, of the form TASK-001, TASK-002, ...
- every assignee is one of the team members listed above
- dependencies only reference ids of other tasks in this list and never form a cycle
- estimated_hours is a positive whole number
- phase is the name of one of the roadmap phases"#;

/// The full set of templates used by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub system: String,
    pub project_details: String,
    pub tasks: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            project_details: DEFAULT_PROJECT_DETAILS_PROMPT.to_string(),
            tasks: DEFAULT_TASKS_PROMPT.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Built-in templates, overridden by any template file present in `dir`
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Prompts directory not found: {}", dir.display());
        }

        let mut templates = Self::default();
        for (file, slot) in [
            (SYSTEM_PROMPT_FILE, &mut templates.system),
            (PROJECT_DETAILS_PROMPT_FILE, &mut templates.project_details),
            (TASKS_PROMPT_FILE, &mut templates.tasks),
        ] {
            let path = dir.join(file);
            if path.exists() {
                log_info!("Loading prompt template from {}", path.display());
                *slot = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read prompt template {}", path.display()))?;
            }
        }

        Ok(templates)
    }

    pub fn render_system(&self, input: &PreprocessedInput) -> String {
        let org = &input.organization;
        safe_format(
            &self.system,
            &[
                ("organization_name", org.name.clone()),
                (
                    "organization_industry",
                    org.industry.clone().unwrap_or_else(|| "unspecified".to_string()),
                ),
                ("organization_about", org.about.clone()),
                (
                    "team_context",
                    input.team_context.clone().unwrap_or_default(),
                ),
                ("team_members", render_team_members(&input.roster)),
            ],
        )
    }

    pub fn render_project_details(&self, input: &PreprocessedInput) -> String {
        safe_format(
            &self.project_details,
            &[("project_description", input.description.clone())],
        )
    }

    pub fn render_tasks(&self, input: &PreprocessedInput, details: &ProjectDetails) -> String {
        safe_format(
            &self.tasks,
            &[
                ("project_title", details.title.clone()),
                ("project_description", details.description.clone()),
                ("original_request", input.description.clone()),
                ("project_summary", details.summary.clone()),
                ("roadmap", render_roadmap(&details.roadmap)),
                ("objectives", render_objectives(&details.objectives)),
                ("key_points", render_key_points(&details.key_points)),
                ("team_members", render_team_members(&input.roster)),
            ],
        )
    }
}

/// Replace each `{key}` in `template` with its value
///
/// Unknown placeholders and other braces are left untouched.
pub fn safe_format(template: &str, replacements: &[(&str, String)]) -> String {
    let mut result = template.to_string();
    for (key, value) in replacements {
        result = result.replace(&format!("{{{}}}", key), value);
    }
    result
}

pub fn render_team_members(roster: &Roster) -> String {
    roster
        .members()
        .iter()
        .map(|m| {
            if m.responsibilities.is_empty() {
                format!("- {}: {}", m.name, m.role)
            } else {
                format!("- {}: {} ({})", m.name, m.role, m.responsibilities)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered<'a>(items: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    items
        .enumerate()
        .map(|(i, (head, body))| format!("{}. {}: {}\n", i + 1, head, body))
        .collect()
}

pub fn render_roadmap(roadmap: &[Phase]) -> String {
    numbered(roadmap.iter().map(|p| (p.name.as_str(), p.description.as_str())))
}

pub fn render_objectives(objectives: &[Objective]) -> String {
    numbered(
        objectives
            .iter()
            .map(|o| (o.objective.as_str(), o.description.as_str())),
    )
}

pub fn render_key_points(points: &[KeyPoint]) -> String {
    numbered(points.iter().map(|k| (k.key_point.as_str(), k.description.as_str())))
}
