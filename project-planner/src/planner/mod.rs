//! Generative project planning pipeline.
//!
//! Turns a free-text project idea and a team profile into a scheduled,
//! analyzed project plan.
//!
//! ## Module Structure
//!
//! - `types` - Data structures shared by all stages
//! - `error` - Error taxonomy and stage identifiers
//! - `config` - Model and schedule settings
//! - `prompts` - Prompt templates and rendering
//! - `cli` - Command-line argument definitions
//! - `utils` - File I/O helpers
//! - `dependency_graph` - Cycle detection and topological ordering
//! - `step1_preprocess` - Validate and normalize the input
//! - `step2_details` - Generate project details
//! - `step3_tasks` - Generate and validate tasks
//! - `step4_calendar` - Schedule tasks
//! - `step5_output` - Aggregate the plan
//! - `workflow` - Main workflow orchestration

pub mod cli;
pub mod config;
pub mod dependency_graph;
pub mod error;
pub mod prompts;
pub mod step1_preprocess;
pub mod step2_details;
pub mod step3_tasks;
pub mod step4_calendar;
pub mod step5_output;
pub mod types;
pub mod utils;
pub mod workflow;

pub use error::{ErrorKind, PipelineError, PlanError, PlanResult, Stage};
pub use workflow::{run_pipeline, run_planning_workflow, run_workflow, WorkflowConfig};
