//! Workflow utilities shared by the generation stages
//!
//! - **agent**: Model provider boundary and logged call execution
//! - **json**: JSON extraction and parsing for model replies

pub mod agent;
pub mod json;

// Re-export commonly used types and functions
pub use agent::{
    execute_model_call, CallStats, Completion, CompletionRequest, ModelProvider, OpenAiProvider,
    ProviderError, ProviderErrorKind, TokenUsage,
};
pub use json::{extract_json, parse_json, preview, unwrap_array};
