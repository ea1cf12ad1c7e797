//! Configuration management for Warden
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (`WARDEN_*`, `__` between nested keys; highest precedence)
//! 2. warden.local.toml (gitignored, local overrides)
//! 3. warden.toml (git-tracked, project config)
//! 4. ~/.config/warden/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [engine]
//! decision_ttl_secs = 900
//!
//! [engine.weights]
//! user = 0.25
//! device = 0.30
//! network = 0.25
//! context = 0.20
//!
//! [engine.thresholds]
//! deny_below = 0.3
//! conditional_below = 0.6
//!
//! [policies]
//! file = "policies.json"
//! include_seed = true
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use warden_engine::EngineConfig;
use warden_policy::{PolicyFormat, PolicySet};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::{LOCAL_CONFIG_FILE, PROJECT_CONFIG_FILE, Paths};

/// Main Warden configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub engine: EngineConfig,
    pub policies: PolicySourceConfig,
    pub logging: LoggingConfig,
}

/// Where the evaluated policy set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySourceConfig {
    /// JSON or TOML policy document, chosen by extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Prepend the built-in seed policies.
    pub include_seed: bool,
}

impl Default for PolicySourceConfig {
    fn default() -> Self {
        Self {
            file: None,
            include_seed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        if let Some(file) = &self.policies.file {
            if file.is_relative() {
                self.policies.file = Some(base_dir.as_ref().join(file));
            }
        }
    }

    /// Checks the engine configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Renders the configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl PolicySourceConfig {
    /// Assembles the effective policy set: the seed policies (if enabled)
    /// followed by the configured document (if any).
    ///
    /// The set is not validated. Unknown operators and action types load as
    /// such and are handled by evaluation; `PolicySet::validate` is for
    /// policy authoring.
    pub fn load_policies(&self) -> Result<PolicySet, ConfigError> {
        let mut set = if self.include_seed {
            PolicySet::seed()
        } else {
            PolicySet::default()
        };

        if let Some(path) = &self.file {
            set = set.extend(read_policy_file(path)?);
        }

        Ok(set)
    }
}

/// Reads and parses a policy document, choosing the format by extension.
pub fn read_policy_file(path: &Path) -> Result<PolicySet, ConfigError> {
    let policy_error = |source| ConfigError::PolicyError {
        path: path.to_path_buf(),
        source,
    };

    let format = PolicyFormat::from_path(path).map_err(policy_error)?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let set = PolicySet::parse(&text, format).map_err(policy_error)?;

    debug!(path = %path.display(), policies = set.len(), "Loaded policy document");
    Ok(set)
}
