//! Lint run configuration.
//!
//! Decides which templates are enabled, carries the raw per-template
//! parameters, and lists the paths the loader should skip.

use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Templates enabled unless `doNotAutoAddDefaults` is set.
pub const DEFAULT_TEMPLATES: &[&str] = &["dangling-service", "latest-tag", "no-job-ttl-seconds"];

/// Configuration for a lint run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintConfig {
    /// If true, enable every registered template.
    #[serde(default, rename = "addAllBuiltIn")]
    pub add_all_builtin: bool,

    /// If true, do not automatically enable [`DEFAULT_TEMPLATES`].
    #[serde(default)]
    pub do_not_auto_add_defaults: bool,

    /// Template keys to enable in addition to the defaults.
    #[serde(default)]
    pub include: Vec<String>,

    /// Template keys to disable. Exclusion always wins.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Glob patterns for paths the loader skips.
    #[serde(default)]
    pub ignore_paths: Vec<String>,

    /// Raw parameters keyed by template key.
    #[serde(default)]
    pub params: BTreeMap<String, serde_yaml::Value>,
}

impl LintConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template to the include list.
    pub fn include(mut self, key: impl Into<String>) -> Self {
        self.include.push(key.into());
        self
    }

    /// Add a template to the exclude list.
    pub fn exclude(mut self, key: impl Into<String>) -> Self {
        self.exclude.push(key.into());
        self
    }

    /// Add a path pattern to ignore.
    pub fn ignore_path(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_paths.push(pattern.into());
        self
    }

    /// Enable all registered templates.
    pub fn with_all_builtin(mut self) -> Self {
        self.add_all_builtin = true;
        self
    }

    /// Disable automatic default templates.
    pub fn without_defaults(mut self) -> Self {
        self.do_not_auto_add_defaults = true;
        self
    }

    /// Set the raw parameters for one template.
    pub fn with_params(mut self, key: impl Into<String>, raw: serde_yaml::Value) -> Self {
        self.params.insert(key.into(), raw);
        self
    }

    /// Raw parameters for a template, `Null` when none are configured.
    pub fn params_for(&self, key: &str) -> &serde_yaml::Value {
        static NULL: serde_yaml::Value = serde_yaml::Value::Null;
        self.params.get(key).unwrap_or(&NULL)
    }

    /// Check if a template is explicitly excluded.
    pub fn is_excluded(&self, key: &str) -> bool {
        self.exclude.iter().any(|e| e == key)
    }

    /// Check if a template is explicitly included.
    pub fn is_included(&self, key: &str) -> bool {
        self.include.iter().any(|i| i == key)
    }

    /// Resolve the enabled template keys, sorted and deduplicated.
    ///
    /// Included keys that are not registered are kept so the run can report
    /// them as unknown templates.
    pub fn resolve_templates(&self, registry: &Registry) -> Vec<String> {
        let mut enabled: BTreeSet<&str> = BTreeSet::new();

        if self.add_all_builtin {
            enabled.extend(registry.keys());
        }
        if !self.do_not_auto_add_defaults {
            enabled.extend(
                DEFAULT_TEMPLATES
                    .iter()
                    .copied()
                    .filter(|key| registry.contains(key)),
            );
        }
        enabled.extend(self.include.iter().map(String::as_str));

        enabled
            .into_iter()
            .filter(|key| !self.is_excluded(key))
            .map(str::to_string)
            .collect()
    }

    /// Check if a file path should be ignored based on `ignore_paths`.
    pub fn should_ignore_path(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        self.ignore_paths.iter().any(|pattern| {
            glob::Pattern::new(pattern).is_ok_and(|glob| glob.matches(&path_str))
                || path_str.contains(pattern.as_str())
        })
    }

    /// Load configuration from a YAML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        Self::load_from_str(&content)
    }

    /// Load configuration from a YAML string.
    ///
    /// An empty document yields the default configuration.
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O error reading config file.
    #[error("I/O error: {0}")]
    Io(String),

    /// Parse error in config file.
    #[error("parse error: {0}")]
    Parse(String),
}
