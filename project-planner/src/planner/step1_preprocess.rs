//! Stage 1: Normalize user intent and team context
//!
//! Turns the raw project description and loosely-structured team profile
//! into a [`PreprocessedInput`]. Purely local; nothing here calls the model.

use std::collections::HashSet;

use serde_json::Value;

use crate::planner::error::{PlanError, PlanResult};
use crate::planner::types::{Organization, PreprocessedInput, Roster, TeamContext, TeamMember};
use project_planner_sdk::log_found;

/// Validate and canonicalize the raw inputs
pub fn preprocess(user_intent: &str, raw_team: &Value) -> PlanResult<PreprocessedInput> {
    let description = normalize_whitespace(user_intent);
    if description.is_empty() {
        return Err(PlanError::validation("project description is empty"));
    }

    if !raw_team.is_object() {
        return Err(PlanError::validation("team context must be a JSON object"));
    }
    if raw_team.get("organization").is_none() {
        return Err(PlanError::validation("team context is missing 'organization'"));
    }
    match raw_team.get("team_members") {
        Some(Value::Array(members)) if members.is_empty() => {
            return Err(PlanError::validation("team roster has no members"));
        }
        Some(Value::Array(_)) => {}
        Some(_) => return Err(PlanError::validation("'team_members' must be an array")),
        None => return Err(PlanError::validation("team context is missing 'team_members'")),
    }

    let team: TeamContext = serde_json::from_value(raw_team.clone())
        .map_err(|e| PlanError::validation(format!("malformed team context: {}", e)))?;

    let organization = normalize_organization(team.organization)?;
    let roster = normalize_roster(team.team_members)?;
    log_found!(roster.len(), "team members");

    let team_context = team
        .team_context
        .map(|c| normalize_whitespace(&c))
        .filter(|c| !c.is_empty());

    Ok(PreprocessedInput {
        description,
        organization,
        team_context,
        roster,
    })
}

fn normalize_organization(org: Organization) -> PlanResult<Organization> {
    let name = normalize_whitespace(&org.name);
    if name.is_empty() {
        return Err(PlanError::validation("organization name is empty"));
    }

    Ok(Organization {
        name,
        about: normalize_whitespace(&org.about),
        industry: org
            .industry
            .map(|i| normalize_whitespace(&i))
            .filter(|i| !i.is_empty()),
    })
}

fn normalize_roster(members: Vec<TeamMember>) -> PlanResult<Roster> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(members.len());

    for (idx, member) in members.into_iter().enumerate() {
        let name = normalize_whitespace(&member.name);
        if name.is_empty() {
            return Err(PlanError::validation(format!(
                "team member #{} has no name",
                idx + 1
            )));
        }

        let role = normalize_role(&member.role);
        if role.is_empty() {
            return Err(PlanError::validation(format!("team member '{}' has no role", name)));
        }

        if !seen.insert(name.to_lowercase()) {
            return Err(PlanError::validation(format!(
                "duplicate team member name '{}'",
                name
            )));
        }

        normalized.push(TeamMember {
            name,
            role,
            responsibilities: normalize_whitespace(&member.responsibilities),
        });
    }

    Ok(Roster::new(normalized))
}

/// Collapse whitespace runs into single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title-case each word of a role
///
/// Short all-caps words (UX, QA, CTO) and mixed-case words (DevOps) keep
/// their inner casing; other words are lowercased after the first letter.
pub fn normalize_role(role: &str) -> String {
    normalize_whitespace(role)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest: String = chars.collect();

    let is_upper = word.chars().all(|c| !c.is_alphabetic() || c.is_uppercase());
    let rest = if is_upper && word.chars().count() > 4 {
        rest.to_lowercase()
    } else {
        rest
    };

    first.to_uppercase().chain(rest.chars()).collect()
}
