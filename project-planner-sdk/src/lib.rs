use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix written in front of every structured event line on stderr
pub const EVENT_PREFIX: &str = "__PP_EVENT__:";

/// Run status for consumers tracking a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

/// Structured logging events emitted by the planning pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineLog {
    /// A run started
    RunStarted {
        run_id: Uuid,
        total_stages: usize,
    },
    /// A run finished, successfully or not
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
        duration_ms: u64,
    },
    /// Stage started
    StageStarted {
        stage: usize,
        name: String,
        total_stages: usize,
    },
    /// Stage completed
    StageCompleted {
        stage: usize,
        name: String,
    },
    /// Stage failed
    StageFailed {
        stage: usize,
        name: String,
        kind: String,
        error: String,
    },
    /// Model call started
    ModelCallStarted {
        stage: usize,
        model: String,
    },
    /// Model call completed
    ModelCallCompleted {
        stage: usize,
        model: String,
        duration_ms: u64,
        input_tokens: Option<u32>,
        output_tokens: Option<u32>,
    },
    /// Model call failed
    ModelCallFailed {
        stage: usize,
        model: String,
        error: String,
        retryable: bool,
    },
    /// Output document written
    PlanWritten {
        file_path: String,
        description: String,
    },
}

impl PipelineLog {
    /// Emit this log event to stderr for machine consumers
    pub fn emit(&self) {
        if let Ok(line) = self.to_line() {
            use std::io::Write;
            eprintln!("{}", line);
            let _ = std::io::stderr().flush();
        }
    }

    /// Render the event as a single prefixed line
    pub fn to_line(&self) -> serde_json::Result<String> {
        Ok(format!("{}{}", EVENT_PREFIX, serde_json::to_string(self)?))
    }

    /// Parse a line produced by [`PipelineLog::to_line`]
    pub fn from_line(line: &str) -> Option<Self> {
        let json = line.trim().strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(json).ok()
    }
}

/// Helper macros for pipeline logging
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $total:expr) => {
        $crate::PipelineLog::RunStarted {
            run_id: $run_id,
            total_stages: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_run_finish {
    ($run_id:expr, $status:expr, $duration_ms:expr) => {
        $crate::PipelineLog::RunFinished {
            run_id: $run_id,
            status: $status,
            duration_ms: $duration_ms,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr, $name:expr, $total:expr) => {
        $crate::PipelineLog::StageStarted {
            stage: $stage,
            name: $name.to_string(),
            total_stages: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $name:expr) => {
        $crate::PipelineLog::StageCompleted {
            stage: $stage,
            name: $name.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_stage_failed {
    ($stage:expr, $name:expr, $kind:expr, $error:expr) => {
        $crate::PipelineLog::StageFailed {
            stage: $stage,
            name: $name.to_string(),
            kind: $kind.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_model_call_start {
    ($stage:expr, $model:expr) => {
        $crate::PipelineLog::ModelCallStarted {
            stage: $stage,
            model: $model.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_model_call_complete {
    ($stage:expr, $model:expr, $duration_ms:expr, $input_tokens:expr, $output_tokens:expr) => {
        $crate::PipelineLog::ModelCallCompleted {
            stage: $stage,
            model: $model.to_string(),
            duration_ms: $duration_ms,
            input_tokens: $input_tokens,
            output_tokens: $output_tokens,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_model_call_failed {
    ($stage:expr, $model:expr, $error:expr, $retryable:expr) => {
        $crate::PipelineLog::ModelCallFailed {
            stage: $stage,
            model: $model.to_string(),
            error: $error.to_string(),
            retryable: $retryable,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_plan_written {
    ($path:expr, $desc:expr) => {
        $crate::PipelineLog::PlanWritten {
            file_path: $path.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Colored, human-readable output that complements the structured
// PipelineLog events above.
// ============================================================================

/// Logs the start of a pipeline stage with a header and description.
///
/// # Example
/// ```
/// use project_planner_sdk::log_stage_start_console;
/// log_stage_start_console!(2, "Project Details", "Generate title, objectives and roadmap");
/// ```
///
/// Outputs:
/// ```text
/// ═══ STAGE 2: Project Details ═══
/// Generate title, objectives and roadmap
/// ```
#[macro_export]
macro_rules! log_stage_start_console {
    ($stage:expr, $title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ STAGE {}: {} ═══\x1b[0m", $stage, $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs the completion of a pipeline stage.
///
/// # Example
/// ```
/// use project_planner_sdk::log_stage_complete_console;
/// log_stage_complete_console!(2);
/// ```
#[macro_export]
macro_rules! log_stage_complete_console {
    ($stage:expr) => {
        println!("\x1b[32m✓ Stage {} complete\x1b[0m", $stage);
    };
}

/// Logs model call statistics.
///
/// # Example
/// ```
/// use project_planner_sdk::log_stats;
/// log_stats!(1250, "gpt-4o", 1234, 567);
/// ```
///
/// Outputs:
/// ```text
/// Statistics: 1250ms, gpt-4o (tokens: 1234 in / 567 out)
/// ```
#[macro_export]
macro_rules! log_stats {
    ($duration_ms:expr, $model:expr, $input_tokens:expr, $output_tokens:expr) => {
        println!(
            "\x1b[2mStatistics: {}ms, {} (tokens: {} in / {} out)\x1b[0m",
            $duration_ms, $model, $input_tokens, $output_tokens
        );
    };
}

/// Logs the number of items found.
///
/// # Example
/// ```
/// use project_planner_sdk::log_found;
/// log_found!(14, "tasks");
/// ```
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        println!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}

/// Logs an informational message.
///
/// # Example
/// ```
/// use project_planner_sdk::log_info;
/// log_info!("Loading company data...");
/// let path = "team.json";
/// log_info!("Loading {}", path);
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use project_planner_sdk::log_warning;
/// log_warning!("Task phase does not match the roadmap");
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs an error message.
///
/// # Example
/// ```
/// use project_planner_sdk::log_error;
/// log_error!("Stage 3 failed: unknown assignee");
/// ```
#[macro_export]
macro_rules! log_error {
    ($message:expr) => {
        eprintln!("\x1b[31m✗ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        eprintln!("\x1b[31m✗ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
///
/// # Example
/// ```
/// use project_planner_sdk::log_file_saved;
/// log_file_saved!("./project_plan.json");
/// ```
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}

/// Logs a debug message (intended to be used conditionally).
///
/// # Example
/// ```
/// use project_planner_sdk::log_debug;
/// log_debug!("Prompt length: 4096");
/// let count = 42;
/// log_debug!("Scheduling {} tasks", count);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        println!("\x1b[2m[DEBUG] {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[2m[DEBUG] {}\x1b[0m", format!($fmt, $($arg)*));
    };
}
