// Output formatting: terminal display and JSON export.

pub mod terminal;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::report::AnalysisResult;

/// Write the full result as pretty-printed JSON.
pub fn write_json(result: &AnalysisResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Format an optional score, with a dash for "no score".
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{s:+.3}"),
        None => "-".to_string(),
    }
}
