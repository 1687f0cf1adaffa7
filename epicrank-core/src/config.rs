//! Configuration file support for epicrank
//!
//! Loads report settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.epicrankrc.json` in the working directory
//! 3. `epicrank.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.
//! Scoring weights and decision thresholds are fixed policy and cannot be
//! configured here.

use crate::epic::Lifecycle;
use crate::report::EvaluatedEpic;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper end of the NDR scale
const MAX_NDR: f64 = 10.0;

/// epicrank configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpicrankConfig {
    /// Maximum number of ranked epics to show
    #[serde(default)]
    pub top: Option<usize>,

    /// Hide epics whose NDR score is below this value
    #[serde(default)]
    pub min_ndr: Option<f64>,

    /// Omit gated epics from the report
    #[serde(default)]
    pub hide_gated: bool,

    /// Reject epics with out-of-range inputs instead of scoring them
    #[serde(default)]
    pub strict: bool,

    /// Only report epics in these lifecycle phases (default: all)
    #[serde(default)]
    pub lifecycles: Vec<Lifecycle>,
}

/// Resolved configuration ready for use
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub top_n: Option<usize>,
    pub min_ndr: Option<f64>,
    pub hide_gated: bool,
    pub strict: bool,
    /// None means every lifecycle phase is reported
    pub lifecycles: Option<Vec<Lifecycle>>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl EpicrankConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        check_filters(self.top, self.min_ndr, &self.lifecycles)
    }

    /// Resolve config into the form the report filter uses
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let lifecycles = if self.lifecycles.is_empty() {
            None
        } else {
            Some(self.lifecycles.clone())
        };

        Ok(ResolvedConfig {
            top_n: self.top,
            min_ndr: self.min_ndr,
            hide_gated: self.hide_gated,
            strict: self.strict,
            lifecycles,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Check if an evaluated epic should appear in the report
    pub fn should_include(&self, evaluated: &EvaluatedEpic) -> bool {
        if self.hide_gated && evaluated.gated() {
            return false;
        }

        if self.min_ndr.is_some_and(|min| evaluated.ndr_score < min) {
            return false;
        }

        if let Some(ref lifecycles) = self.lifecycles {
            return lifecycles.contains(&evaluated.epic.lifecycle);
        }

        true
    }

    /// Re-check filters after CLI overrides have been merged in
    pub fn validate(&self) -> Result<()> {
        check_filters(
            self.top_n,
            self.min_ndr,
            self.lifecycles.as_deref().unwrap_or_default(),
        )
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        EpicrankConfig::default().resolve()
    }
}

fn check_filters(
    top: Option<usize>,
    min_ndr: Option<f64>,
    lifecycles: &[Lifecycle],
) -> Result<()> {
    if top == Some(0) {
        anyhow::bail!("top must be at least 1 (got 0)");
    }

    if let Some(min) = min_ndr {
        if !min.is_finite() {
            anyhow::bail!("min_ndr must be a finite number (got {})", min);
        }
        if min < 0.0 {
            anyhow::bail!("min_ndr must be non-negative (got {})", min);
        }
        if min > MAX_NDR {
            anyhow::bail!("min_ndr must be at most {} (got {})", MAX_NDR, min);
        }
    }

    for (i, lifecycle) in lifecycles.iter().enumerate() {
        if lifecycles[..i].contains(lifecycle) {
            anyhow::bail!("lifecycles lists {} more than once", lifecycle.as_str());
        }
    }

    Ok(())
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.epicrankrc.json`
/// 2. `epicrank.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(EpicrankConfig, PathBuf)>> {
    for name in [".epicrankrc.json", "epicrank.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<EpicrankConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: EpicrankConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (EpicrankConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
