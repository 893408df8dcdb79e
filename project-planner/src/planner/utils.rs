//! File I/O helpers for the project planner

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::planner::cli::OutputFormat;

/// Load the project description from a text file
pub fn load_user_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read project description: {}", path.display()))
}

/// Load a team context file
///
/// `.yaml`/`.yml` files are read as YAML, everything else as JSON. Either way
/// the result is a JSON value for the preprocessor to validate.
pub fn load_team_context(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read team context: {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse team context YAML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse team context JSON: {}", path.display()))
    }
}

/// Serialize a document in the requested format
pub fn render_document<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize plan as JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to serialize plan as YAML"),
    }
}

/// Write a document to disk, creating parent directories
pub fn save_document<T: Serialize>(value: &T, path: &Path, format: OutputFormat) -> Result<()> {
    let content = render_document(value, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
