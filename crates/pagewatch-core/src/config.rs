//! Layered tracker configuration.
//!
//! Sources, lowest to highest priority:
//!
//! 1. Built-in defaults ([`TrackerConfig::default`])
//! 2. A TOML file: the explicit `--config` path (must exist), otherwise
//!    `pagewatch.toml` in the working directory if present
//! 3. Environment variables: `PAGEWATCH_POLL_INTERVAL_SECS=10`,
//!    `PAGEWATCH_DIFF__MAX_CHAR_CELLS=1000000`
//!
//! ```toml
//! poll_interval_secs = 5
//! output_dir = "Changes"
//! request_timeout_secs = 30
//! user_agent = "pagewatch/0.1"
//!
//! [diff]
//! max_char_cells = 4000000
//! ```

use crate::diff::DiffOptions;
use crate::errors::{ExError, PageWatchError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "pagewatch.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PAGEWATCH";

/// Directory reports are written to unless configured otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "Changes";

/// Settings for tracking a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Seconds between polls
    pub poll_interval_secs: u64,
    /// Directory receiving report artifacts, created on demand
    pub output_dir: PathBuf,
    /// Per-request timeout of the HTTP source
    pub request_timeout_secs: u64,
    /// `User-Agent` header sent by the HTTP source
    pub user_agent: String,
    pub diff: DiffOptions,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            request_timeout_secs: 30,
            user_agent: concat!("pagewatch/", env!("CARGO_PKG_VERSION")).to_string(),
            diff: DiffOptions::default(),
        }
    }
}

impl TrackerConfig {
    /// Load with the default layering; see [`ConfigLoader`].
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a source cannot be read or parsed, or the merged
    /// result fails [`TrackerConfig::validate`].
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut loader = ConfigLoader::new();
        if let Some(file) = file {
            loader = loader.with_file(file);
        }
        loader.load()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject settings that would make tracking spin or never finish.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.poll_interval_secs == 0 {
            Some("poll_interval_secs must be greater than zero")
        } else if self.request_timeout_secs == 0 {
            Some("request_timeout_secs must be greater than zero")
        } else if self.diff.max_char_cells == 0 {
            Some("diff.max_char_cells must be greater than zero")
        } else if self.output_dir.as_os_str().is_empty() {
            Some("output_dir must not be empty")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ExError::from(PageWatchError::InvalidConfig {
                reason: reason.to_string(),
            })
            .with_op("validate_config")),
            None => Ok(()),
        }
    }
}

/// Builds a [`TrackerConfig`] from defaults, a file and the environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use `path` instead of the optional working-directory file. The file
    /// must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// # Errors
    ///
    /// `InvalidConfig` if a source cannot be read or parsed, or validation
    /// fails.
    pub fn load(&self) -> Result<TrackerConfig> {
        let defaults = Config::try_from(&TrackerConfig::default())?;

        let file = match &self.file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let config: TrackerConfig = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }
}
