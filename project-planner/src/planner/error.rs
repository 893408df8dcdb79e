//! Error taxonomy for the planning pipeline.
//!
//! Every stage returns `Result<T, PlanError>`. The orchestrator wraps the
//! first failure in a [`PipelineError`] that also names the failing stage.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::workflow_utils::agent::ProviderError;

/// Pipeline stage identifiers, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preprocess,
    ProjectDetails,
    Tasks,
    Calendar,
    Output,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Preprocess,
        Stage::ProjectDetails,
        Stage::Tasks,
        Stage::Calendar,
        Stage::Output,
    ];

    /// 1-based position of the stage in the pipeline
    pub fn number(self) -> usize {
        match self {
            Stage::Preprocess => 1,
            Stage::ProjectDetails => 2,
            Stage::Tasks => 3,
            Stage::Calendar => 4,
            Stage::Output => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Preprocess => "Preprocessing",
            Stage::ProjectDetails => "Project Details",
            Stage::Tasks => "Task Generation",
            Stage::Calendar => "Calendar Generation",
            Stage::Output => "Output Aggregation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {} ({})", self.number(), self.name())
    }
}

/// Coarse error classification used for retry decisions and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Provider,
    Schema,
    Reference,
    Cycle,
    Scheduling,
    Consistency,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Provider => "provider",
            ErrorKind::Schema => "schema",
            ErrorKind::Reference => "reference",
            ErrorKind::Cycle => "cycle",
            ErrorKind::Scheduling => "scheduling",
            ErrorKind::Consistency => "consistency",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by pipeline stages
#[derive(Debug, Error)]
pub enum PlanError {
    /// Input is missing required fields or is malformed. Raised before any model call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The model provider could not be reached or rejected the request
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The model answered, but not in the expected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// A produced record references something that does not exist
    #[error("Reference error: {0}")]
    Reference(String),

    /// The task dependency graph contains a cycle
    #[error("Cycle error: dependency cycle {}", .cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    /// Scheduling invariants could not be satisfied
    #[error("Scheduling error: {0}")]
    Scheduling(String),

    /// Aggregation received inconsistent input
    #[error("Consistency error: {0}")]
    Consistency(String),
}

impl PlanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::Validation(_) => ErrorKind::Validation,
            PlanError::Provider(_) => ErrorKind::Provider,
            PlanError::Schema(_) => ErrorKind::Schema,
            PlanError::Reference(_) => ErrorKind::Reference,
            PlanError::Cycle { .. } => ErrorKind::Cycle,
            PlanError::Scheduling(_) => ErrorKind::Scheduling,
            PlanError::Consistency(_) => ErrorKind::Consistency,
        }
    }

    /// Only transient provider failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            PlanError::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        PlanError::Validation(msg.into())
    }

    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        PlanError::Schema(msg.into())
    }

    pub(crate) fn reference(msg: impl Into<String>) -> Self {
        PlanError::Reference(msg.into())
    }

    pub(crate) fn scheduling(msg: impl Into<String>) -> Self {
        PlanError::Scheduling(msg.into())
    }

    pub(crate) fn consistency(msg: impl Into<String>) -> Self {
        PlanError::Consistency(msg.into())
    }
}

/// First failure of a pipeline run, tagged with the stage that raised it
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub error: PlanError,
}

impl PipelineError {
    pub fn new(stage: Stage, error: PlanError) -> Self {
        Self { stage, error }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    pub fn is_retryable(&self) -> bool {
        self.error.is_retryable()
    }
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;
