//! Configuration file schema for verbcheck.
//!
//! The config is optional. It scopes which files are scanned and supplies
//! attribute ancestry the scanner cannot see in source.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::rule::VerbChoice;

/// File names tried when no `--config` is given, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["verbcheck.yaml", ".verbcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub name: String,
    /// Whether to include test files in analysis (default: false)
    #[serde(default)]
    pub include_test_files: Option<bool>,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/Migrations/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Attribute class name -> immediate base, for attributes declared in
    /// referenced assemblies.
    #[serde(default)]
    pub attribute_bases: HashMap<String, String>,
    /// Verb used by `fix` when none is given (default: get)
    #[serde(default)]
    pub default_verb: Option<VerbChoice>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Returns whether to include test files (defaults to false).
    pub fn should_include_test_files(&self) -> bool {
        self.include_test_files.unwrap_or(false)
    }

    /// Returns the fix verb (defaults to get).
    pub fn default_verb(&self) -> VerbChoice {
        self.default_verb.unwrap_or(VerbChoice::Get)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        self.excluded_paths.iter().any(|pattern| {
            globset::Glob::new(pattern)
                .map(|glob| glob.compile_matcher().is_match(&*path_str))
                .unwrap_or(false)
        })
    }
}

/// Look for a config file in `dir`.
pub fn discover(dir: &Path) -> Option<std::path::PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    for (class, base) in &config.attribute_bases {
        if class.trim().is_empty() {
            anyhow::bail!("attribute_bases contains an empty attribute name");
        }
        if base.trim().is_empty() {
            anyhow::bail!("attribute_bases entry {:?} has an empty base", class);
        }
    }

    Ok(())
}
