//! Persistence layer.
//!
//! Reads game histories exported from the upstream feed and writes
//! prediction results, both as JSON files.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::types::GameRecord;

/// Load a JSON array of feed records, sorted newest-first.
///
/// Records with an unknown color code or an out-of-range roll fail the
/// whole load.
pub fn load_history(path: impl AsRef<Path>) -> Result<Vec<GameRecord>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history from {}", path.display()))?;

    let mut history: Vec<GameRecord> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse history from {}", path.display()))?;
    history.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));

    info!(
        path = %path.display(),
        records = history.len(),
        newest = ?history.first().map(|r| r.occurred_at()),
        "History loaded"
    );

    Ok(history)
}

/// Write any serializable result (prediction or comparison) as pretty JSON.
pub fn save_prediction<T: Serialize>(result: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(result).context("Failed to serialise prediction")?;

    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write prediction to {}", path.display()))?;

    debug!(path = %path.display(), bytes = json.len(), "Prediction saved");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
