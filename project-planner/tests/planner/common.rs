//! Common test utilities for planner tests

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use project_planner::planner::config::{PipelineConfig, ScheduleOptions};
use project_planner::workflow_utils::{
    Completion, CompletionRequest, ModelProvider, ProviderError, ProviderErrorKind, TokenUsage,
};

/// Model provider that replays canned replies in order and records every request
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider answering the details call, then the tasks call
    pub fn replying(details: &str, tasks: &str) -> Self {
        Self::new(vec![Ok(details.to_string()), Ok(tasks.to_string())])
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ProviderError::new(
                ProviderErrorKind::EmptyResponse,
                "script exhausted",
            ))
        })?;
        Ok(Completion {
            text: reply,
            usage: Some(TokenUsage {
                input_tokens: 120,
                output_tokens: 80,
            }),
        })
    }
}

pub fn start_date() -> NaiveDate {
    // a Monday
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

pub fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        schedule: ScheduleOptions::starting(start_date()),
        ..PipelineConfig::default()
    }
}

pub const LANDING_PAGE_INTENT: &str = "Build a landing page";

/// Two-person team: Alice the engineer, Bob the designer
pub fn sample_team() -> Value {
    json!({
        "organization": {
            "name": "Acme",
            "description": "Makes anvils",
            "industry": "Manufacturing"
        },
        "team_context": "Small remote team",
        "team_members": [
            {"name": "Alice", "role": "Engineer", "responsibilities": "Frontend and backend"},
            {"name": "Bob", "role": "Designer", "responsibilities": "Visual design and copy"}
        ]
    })
}

pub fn details_reply() -> String {
    json!({
        "title": "Acme Landing Page",
        "description": "A single marketing page for the anvil catalog.",
        "summary": "Design, build and launch one page.",
        "objectives": [
            {"objective": "Launch the page", "description": "Live on the main domain"}
        ],
        "key_points": [
            {"key_point": "Mobile first", "description": "Most traffic is mobile"}
        ],
        "roadmap": [
            {"name": "Design", "description": "Mockups and copy"},
            {"name": "Build", "description": "Implementation"},
            {"name": "Launch", "description": "QA and release"}
        ]
    })
    .to_string()
}

pub fn task(id: &str, title: &str, assignee: &str, hours: u32, deps: &[&str], phase: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": format!("{} for the landing page", title),
        "assignee": assignee,
        "dependencies": deps,
        "estimated_hours": hours,
        "priority": "high",
        "phase": phase
    })
}

pub fn tasks_reply(tasks: Vec<Value>) -> String {
    json!({ "tasks": tasks }).to_string()
}

/// Landing page breakdown that only uses Alice and Bob
pub fn landing_page_tasks() -> String {
    tasks_reply(vec![
        task("T1", "Design mockups", "Bob", 16, &[], "Design"),
        task("T2", "Develop page", "Alice", 24, &["T1"], "Build"),
        task("T3", "Write copy", "Bob", 8, &[], "Design"),
        task("T4", "Testing and launch", "alice", 8, &["T2", "T3"], "Launch"),
    ])
}
