//! Convenience helpers shared across command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use playcards::{CardRecord, load_records};

/// Load a CSV track list, attaching the path to any error.
pub fn load_csv(path: &Path) -> Result<Vec<CardRecord>> {
    load_records(path).with_context(|| format!("failed to read records from {}", path.display()))
}

/// Document title derived from the input file name.
pub fn title_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Cards".to_string())
}
