//! Loading epic collections from JSON
//!
//! The collection is owned by the caller; this module only parses it.

use crate::epic::Epic;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a JSON array of epics
pub fn parse_epics(content: &str) -> Result<Vec<Epic>> {
    let epics: Vec<Epic> =
        serde_json::from_str(content).context("failed to parse epics: expected a JSON array")?;
    Ok(epics)
}

/// Load a JSON array of epics from a file
pub fn load_epics(path: &Path) -> Result<Vec<Epic>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read epics file: {}", path.display()))?;

    let epics =
        parse_epics(&content).with_context(|| format!("invalid epics file: {}", path.display()))?;

    tracing::debug!(count = epics.len(), path = %path.display(), "loaded epics");
    Ok(epics)
}
