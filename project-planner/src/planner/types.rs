//! Data types for the project planning pipeline.
//!
//! Types are grouped by the stage that produces them:
//!
//! 1. **Team Context** - Raw organization/team input
//! 2. **Preprocessed Input** - Canonical form produced by the preprocessor
//! 3. **Project Details** - Title, objectives and roadmap from the model
//! 4. **Tasks** - Validated task records with assignees and dependencies
//! 5. **Calendar** - Tasks with start/end dates
//! 6. **Project Plan** - Final aggregate with analytics

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflow_utils::CallStats;

// ============================================================================
// Team Context Types
// ============================================================================

/// Organization/team profile as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamContext {
    pub organization: Organization,

    /// Free-text notes about how the team works
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_context: Option<String>,

    pub team_members: Vec<TeamMember>,
}

/// Organization information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,

    /// What the organization does
    #[serde(default, alias = "description")]
    pub about: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

/// A member of the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub responsibilities: String,
}

// ============================================================================
// Preprocessed Input
// ============================================================================

/// Canonical form of the user intent and team context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedInput {
    /// Whitespace-normalized project description
    pub description: String,
    pub organization: Organization,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_context: Option<String>,
    pub roster: Roster,
}

/// Ordered collection of team members available for assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(Vec<TeamMember>);

impl Roster {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Self(members)
    }

    pub fn members(&self) -> &[TeamMember] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Find a member by name, ignoring case and surrounding whitespace
    pub fn find(&self, name: &str) -> Option<&TeamMember> {
        let needle = name.trim();
        self.0.iter().find(|m| same_name(&m.name, needle))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

/// Case-insensitive name comparison that also folds non-ASCII letters
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

// ============================================================================
// Project Details
// ============================================================================

/// Project description, objectives and roadmap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub title: String,
    pub description: String,

    /// Short analysis of the request
    #[serde(default)]
    pub summary: String,

    pub objectives: Vec<Objective>,

    #[serde(default)]
    pub key_points: Vec<KeyPoint>,

    pub roadmap: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub objective: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPoint {
    pub key_point: String,
    #[serde(default)]
    pub description: String,
}

/// Roadmap phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

// ============================================================================
// Task Types
// ============================================================================

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    /// Lenient parse used on model output
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "normal" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "critical" | "urgent" => Some(Priority::Critical),
            _ => None,
        }
    }
}

/// Task category derived from keywords in the title and description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTag {
    Meeting,
    Research,
    Design,
    Development,
    Testing,
    Documentation,
    Marketing,
    Other,
}

impl TaskTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskTag::Meeting => "meeting",
            TaskTag::Research => "research",
            TaskTag::Design => "design",
            TaskTag::Development => "development",
            TaskTag::Testing => "testing",
            TaskTag::Documentation => "documentation",
            TaskTag::Marketing => "marketing",
            TaskTag::Other => "other",
        }
    }
}

impl fmt::Display for TaskTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique within a run
    pub id: String,
    pub title: String,
    pub description: String,

    /// Roster member name, in roster spelling
    pub assignee: String,

    /// Ids of tasks that must finish first
    #[serde(default)]
    pub dependencies: Vec<String>,

    pub estimated_hours: u32,

    #[serde(default)]
    pub priority: Priority,

    /// Roadmap phase this task belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    pub tag: TaskTag,
}

// ============================================================================
// Calendar Types
// ============================================================================

/// Task with an inclusive date interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub task: Task,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ScheduledTask {
    /// Calendar days covered, both ends included
    pub fn calendar_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Whether two inclusive intervals share at least one day
    pub fn overlaps(&self, other: &ScheduledTask) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }
}

// ============================================================================
// Project Plan
// ============================================================================

/// Final plan document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub organization: String,
    pub details: ProjectDetails,
    pub tasks: Vec<ScheduledTask>,
    pub analytics: Analytics,
}

/// Derived statistics over the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_tasks: usize,
    pub total_estimated_hours: u64,
    pub timeline: Timeline,
    pub workload: BTreeMap<String, Workload>,
    pub phases: BTreeMap<String, usize>,
    pub tags: BTreeMap<TaskTag, TagStats>,
    /// Longest dependency chain, ending at the last-finishing task
    pub critical_path: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub task_count: usize,
    pub estimated_hours: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStats {
    pub count: usize,
    pub total_days: i64,
}

// ============================================================================
// Run Output
// ============================================================================

/// Everything a successful run produces
#[derive(Debug, Clone, Serialize)]
pub struct PlanRun {
    pub run_id: uuid::Uuid,
    pub plan: ProjectPlan,
    /// One entry per model call, in call order
    pub model_calls: Vec<CallStats>,
    pub duration_ms: u64,
}
