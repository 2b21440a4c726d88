//! Prompt driver configuration
//!
//! Resolution order, highest first: command line flags, `INPUTGRAPH_*`
//! environment variables, the config file, built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::env::EnvProvider;

/// Names the config file when `--config` is not given.
pub const CONFIG_ENV: &str = "INPUTGRAPH_CONFIG";

// ============================================================================
// PROMPT CONFIG
// ============================================================================

/// Settings of the text prompt driver and the reference renderer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PromptConfig {
    /// Line width for dividers and wrapped descriptions
    pub width: usize,
    /// Replacement shown for sensitive values
    pub mask: String,
    /// Only ask for fields carrying one of these tags
    pub tags: Vec<String>,
    /// Show default values in the reference
    pub show_defaults: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            width: 80,
            mask: "****".to_string(),
            tags: Vec::new(),
            show_defaults: true,
        }
    }
}

impl PromptConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("invalid prompt configuration")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file '{}'", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("in config file '{}'", path.display()))
    }

    /// Load the config file (if any) and apply environment overrides.
    pub fn load(path: Option<&Path>, env: &dyn EnvProvider) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env.var(CONFIG_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        Ok(config)
    }

    /// Apply `INPUTGRAPH_WIDTH`, `INPUTGRAPH_MASK`, `INPUTGRAPH_TAGS`
    /// (comma separated) and `INPUTGRAPH_SHOW_DEFAULTS`.
    pub fn apply_env(&mut self, env: &dyn EnvProvider) -> Result<()> {
        if let Some(width) = env.var("INPUTGRAPH_WIDTH") {
            self.width = width
                .trim()
                .parse()
                .with_context(|| format!("INPUTGRAPH_WIDTH must be a number, got '{width}'"))?;
        }
        if let Some(mask) = env.var("INPUTGRAPH_MASK") {
            self.mask = mask;
        }
        if let Some(tags) = env.var("INPUTGRAPH_TAGS") {
            self.tags = split_tags(&tags);
        }
        if let Some(flag) = env.var("INPUTGRAPH_SHOW_DEFAULTS") {
            self.show_defaults = matches!(flag.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    /// Apply command line overrides. Empty tags leave the configured tags.
    pub fn apply_cli(&mut self, width: Option<usize>, tags: &[String]) {
        if let Some(width) = width {
            self.width = width;
        }
        if !tags.is_empty() {
            self.tags = tags.to_vec();
        }
    }
}

fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
