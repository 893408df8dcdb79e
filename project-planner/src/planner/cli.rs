//! CLI argument definitions for the project planner.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::planner::config::{DEFAULT_HOURS_PER_DAY, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Serialization format for the written plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

/// Generative project planner
///
/// Turns a free-text project idea and a team profile into a scheduled plan:
///
/// - Stage 1: Normalize the request and roster
/// - Stage 2: Generate title, objectives and roadmap
/// - Stage 3: Generate tasks with assignees and dependencies
/// - Stage 4: Schedule tasks on a working-day calendar
/// - Stage 5: Aggregate the plan and analytics
#[derive(Parser, Debug, Clone)]
#[command(name = "project-planner")]
#[command(about = "Generate a scheduled project plan from an idea and a team profile")]
#[command(version)]
pub struct Args {
    /// Project description as free text
    ///
    /// Mutually exclusive with --input.
    #[arg(value_name = "DESCRIPTION")]
    pub description: Option<String>,

    /// Read the project description from a file
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<String>,

    /// Team context file (JSON or YAML)
    #[arg(long, short = 't', value_name = "PATH")]
    pub team: String,

    /// Where to write the plan
    ///
    /// Defaults to ./project_plan.json (or .yaml with --format yaml)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Model used for project details
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_MODEL)]
    pub details_model: String,

    /// Model used for task generation
    #[arg(long, value_name = "MODEL", default_value = DEFAULT_MODEL)]
    pub tasks_model: String,

    /// Sampling temperature for both generation stages
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// First day of the schedule (defaults to today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,

    /// Working hours per day
    #[arg(long, value_name = "HOURS", default_value_t = DEFAULT_HOURS_PER_DAY)]
    pub hours_per_day: u32,

    /// Schedule work on Saturdays and Sundays too
    #[arg(long)]
    pub include_weekends: bool,

    /// Let one person hold overlapping tasks
    #[arg(long)]
    pub allow_double_booking: bool,

    /// Directory with prompt template overrides
    ///
    /// Any of system_prompt.txt, project_details_prompt.txt and
    /// tasks_prompt.txt found there replaces the built-in template.
    #[arg(long, value_name = "DIR")]
    pub prompts_dir: Option<String>,

    /// API key for the model provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub timeout_secs: u64,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Exactly one description source must be given
    pub fn validate_input(&self) -> Result<()> {
        match (&self.description, &self.input) {
            (Some(_), Some(_)) => {
                anyhow::bail!("Give the project description either inline or with --input, not both")
            }
            (None, None) => {
                anyhow::bail!("A project description is required (inline or with --input)")
            }
            _ => Ok(()),
        }
    }

    /// Validate scheduling and sampling parameters
    pub fn validate_settings(&self) -> Result<()> {
        if !(1..=24).contains(&self.hours_per_day) {
            anyhow::bail!(
                "--hours-per-day must be between 1 and 24, got {}",
                self.hours_per_day
            );
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "--temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("--timeout-secs must be positive");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_input()?;
        self.validate_settings()
    }
}
