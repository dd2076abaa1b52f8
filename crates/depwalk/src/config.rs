//! Configuration management for depwalk.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. A YAML file (`depwalk.yaml` by default). A missing file yields defaults.
//! 2. `DEPWALK_*` environment variables.
//! 3. Command line flags, applied by the CLI.
//!
//! ```yaml
//! store:
//!   data-file: data/libraries.jsonl
//!   strict: false
//! traversal:
//!   max-concurrent-lookups: 16
//!   timeout-secs: 30
//!   known-ids-file: data/known_ids.txt
//!   filter-by-store-ids: false
//! ```

use crate::error::{ConfigError, Result};
use crate::traversal::{DEFAULT_MAX_CONCURRENT_LOOKUPS, TraversalOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "depwalk.yaml";

/// Path to the document file.
pub const ENV_DATA_FILE: &str = "DEPWALK_DATA_FILE";
/// Concurrency cap for point reads.
pub const ENV_MAX_CONCURRENT_LOOKUPS: &str = "DEPWALK_MAX_CONCURRENT_LOOKUPS";
/// Overall traversal timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "DEPWALK_TIMEOUT_SECS";
/// Path to the known-id list.
pub const ENV_KNOWN_IDS_FILE: &str = "DEPWALK_KNOWN_IDS_FILE";
/// Fail the load on the first bad record.
pub const ENV_STRICT_LOAD: &str = "DEPWALK_STRICT_LOAD";

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    (ENV_DATA_FILE, "Path to the library documents (.jsonl or .json)"),
    (
        ENV_MAX_CONCURRENT_LOOKUPS,
        "Maximum point reads in flight per traversal level",
    ),
    (ENV_TIMEOUT_SECS, "Overall traversal timeout in seconds"),
    (
        ENV_KNOWN_IDS_FILE,
        "Newline-separated list of ids known to exist in the store",
    ),
    (
        ENV_STRICT_LOAD,
        "Fail on the first malformed or invalid document (1/true or 0/false)",
    ),
];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DepwalkConfig {
    /// Document source.
    pub store: StoreConfig,

    /// Traversal tuning.
    pub traversal: TraversalConfig,
}

/// Store configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct StoreConfig {
    /// Path to the document file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Treat load warnings as errors.
    pub strict: bool,
}

/// Traversal configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct TraversalConfig {
    /// Maximum point reads in flight per level.
    pub max_concurrent_lookups: usize,

    /// Overall timeout in seconds. Absent means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Known-id list used to skip doomed lookups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_ids_file: Option<PathBuf>,

    /// Build the known-id filter from the loaded store's own ids.
    pub filter_by_store_ids: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            timeout_secs: None,
            known_ids_file: None,
            filter_by_store_ids: false,
        }
    }
}

/// An environment variable the configuration reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarInfo {
    /// Variable name.
    pub name: &'static str,
    /// What it controls.
    pub description: &'static str,
    /// Current value, if set.
    pub value: Option<String>,
}

/// List every environment variable depwalk reads, with its current value.
#[must_use]
pub fn defined_environment_variables() -> Vec<EnvVarInfo> {
    ENVIRONMENT_VARIABLES
        .iter()
        .map(|&(name, description)| EnvVarInfo {
            name,
            description,
            value: std::env::var(name).ok(),
        })
        .collect()
}

impl DepwalkConfig {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the text is not valid configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Yaml(e.to_string()).into())
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path).await
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Apply `DEPWALK_*` overrides from the process environment.
    ///
    /// Unusable values are logged and ignored.
    pub fn apply_env(&mut self) {
        for rejected in self.apply_env_with(|name| std::env::var(name).ok()) {
            tracing::warn!(error = %rejected, "Ignoring environment override");
        }
    }

    /// Apply overrides read through `lookup`.
    ///
    /// Returns the values that were rejected; valid ones are applied even
    /// when others fail. Empty values count as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Vec<ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut rejected = Vec::new();

        if let Some(path) = get(ENV_DATA_FILE) {
            self.store.data_file = Some(PathBuf::from(path));
        }

        if let Some(raw) = get(ENV_MAX_CONCURRENT_LOOKUPS) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.traversal.max_concurrent_lookups = n,
                _ => rejected.push(ConfigError::InvalidEnvVar {
                    name: ENV_MAX_CONCURRENT_LOOKUPS,
                    value: raw,
                }),
            }
        }

        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.traversal.timeout_secs = Some(secs),
                Err(_) => rejected.push(ConfigError::InvalidEnvVar {
                    name: ENV_TIMEOUT_SECS,
                    value: raw,
                }),
            }
        }

        if let Some(path) = get(ENV_KNOWN_IDS_FILE) {
            self.traversal.known_ids_file = Some(PathBuf::from(path));
        }

        if let Some(raw) = get(ENV_STRICT_LOAD) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => self.store.strict = true,
                "0" | "false" => self.store.strict = false,
                _ => rejected.push(ConfigError::InvalidEnvVar {
                    name: ENV_STRICT_LOAD,
                    value: raw,
                }),
            }
        }

        rejected
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConcurrency`] if
    /// `max-concurrent-lookups` is 0.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.traversal_options().validate()
    }

    /// Configured data file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDataFile`] when none is set.
    pub fn data_file(&self) -> std::result::Result<&Path, ConfigError> {
        self.store
            .data_file
            .as_deref()
            .ok_or(ConfigError::MissingDataFile)
    }

    /// Engine options derived from the traversal section.
    #[must_use]
    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            max_concurrent_lookups: self.traversal.max_concurrent_lookups,
            timeout: self.traversal.timeout_secs.map(Duration::from_secs),
        }
    }
}
