//! Pipeline configuration threaded through every stage.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::planner::prompts::PromptTemplates;
use crate::workflow_utils::CompletionRequest;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_HOURS_PER_DAY: u32 = 8;

/// Model choice and sampling parameters for one generation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl ModelSettings {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }

    /// Build a JSON-mode request with these settings
    pub fn request(&self, system: String, user: String) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            system,
            user,
            json_mode: true,
        }
    }
}

/// Calendar generation options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// First day any task may start
    pub start_date: NaiveDate,

    /// Working hours in one day, used to turn estimates into days
    pub hours_per_day: u32,

    /// Never place work on Saturday or Sunday
    pub skip_weekends: bool,

    /// Let one assignee hold overlapping tasks
    pub allow_double_booking: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            start_date: Local::now().date_naive(),
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            skip_weekends: true,
            allow_double_booking: false,
        }
    }
}

impl ScheduleOptions {
    pub fn starting(start_date: NaiveDate) -> Self {
        Self {
            start_date,
            ..Self::default()
        }
    }
}

/// Read-only configuration for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub details_model: ModelSettings,
    pub tasks_model: ModelSettings,
    pub schedule: ScheduleOptions,
    pub prompts: PromptTemplates,
}
