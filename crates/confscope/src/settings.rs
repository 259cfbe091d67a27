// Copyright (c) Contributors to the confscope project.
// SPDX-License-Identifier: Apache-2.0

//! Runtime settings for loaders and the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::loader::DEFAULT_MAX_INCLUDE_DEPTH;
use crate::{Error, Result};

#[cfg(test)]
#[path = "./settings_test.rs"]
mod settings_test;

/// Environment variable overriding [`Settings::source_dir`].
pub const ENV_SOURCE_DIR: &str = "CONFSCOPE_DIR";
/// Environment variable overriding [`Settings::default_environment`].
pub const ENV_DEFAULT_ENVIRONMENT: &str = "CONFSCOPE_ENV";
/// Environment variable overriding [`Settings::max_include_depth`].
pub const ENV_MAX_INCLUDE_DEPTH: &str = "CONFSCOPE_MAX_INCLUDE_DEPTH";
/// Environment variable overriding [`Settings::poll_interval_ms`].
pub const ENV_POLL_INTERVAL_MS: &str = "CONFSCOPE_POLL_INTERVAL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `<name>.json` / `<name>.yaml` sources.
    pub source_dir: PathBuf,

    /// Environment used when a caller does not name one, e.g. `dev.eu`.
    pub default_environment: String,

    /// Longest include chain followed while composing.
    pub max_include_depth: usize,

    /// How often watched sources are checked for changes.
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            default_environment: String::new(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            poll_interval_ms: 2000,
        }
    }
}

impl Settings {
    /// Parse settings from YAML; missing fields keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| Error::InvalidSettings(e.to_string()))
    }

    /// Load from an optional settings file, then apply `CONFSCOPE_*`
    /// environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|error| Error::ReadFailed {
                    path: path.to_path_buf(),
                    error,
                })?;
                Self::from_yaml(&yaml)?
            }
            None => Self::default(),
        };
        settings.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(settings)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SOURCE_DIR) {
            self.source_dir = PathBuf::from(dir);
        }
        if let Some(env) = lookup(ENV_DEFAULT_ENVIRONMENT) {
            self.default_environment = env;
        }
        if let Some(depth) = lookup(ENV_MAX_INCLUDE_DEPTH) {
            self.max_include_depth = depth.trim().parse().map_err(|_| {
                Error::InvalidSettings(format!("{ENV_MAX_INCLUDE_DEPTH} must be a number, got '{depth}'"))
            })?;
        }
        if let Some(interval) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = interval.trim().parse().map_err(|_| {
                Error::InvalidSettings(format!("{ENV_POLL_INTERVAL_MS} must be a number, got '{interval}'"))
            })?;
        }
        Ok(())
    }

    pub fn default_environment(&self) -> Environment {
        self.default_environment.parse().unwrap_or_default()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// The source directory with `~/` expanded, canonicalized.
    pub fn resolved_source_dir(&self) -> Result<PathBuf> {
        let dir = self.source_dir.to_string_lossy();
        let path = if let Some(rel) = dir.strip_prefix("~/").or(dir.strip_prefix("~")) {
            let home = dirs::home_dir().ok_or_else(|| {
                Error::InvalidSettings("Cannot resolve ~ without HOME".to_string())
            })?;
            home.join(rel)
        } else {
            self.source_dir.clone()
        };
        dunce::canonicalize(&path).map_err(|error| Error::ReadFailed { path, error })
    }
}
