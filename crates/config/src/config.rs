//! Runtime settings shared by the resource wrappers

use reclaim_core::{
    constants::{DEFAULT_LIVE_THRESHOLD, DEFAULT_LOGGER_FILENAME, DEFAULT_LOG_FILTER},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Immutable settings, cheap to clone and share across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReclaimConfig {
    /// Tracing filter directive (e.g. "info", "reclaim_resource=debug")
    pub log_filter: String,

    /// Live entities tolerated before the pressure check asks for a sweep
    pub live_threshold: usize,

    /// Default destination of `StreamLogger`
    pub logger_path: PathBuf,

    /// Whether `FileWriter` holds an exclusive lock on its file
    pub exclusive_access: bool,

    /// Whether signal and panic hooks run the reclamation registry
    pub install_handlers: bool,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            live_threshold: DEFAULT_LIVE_THRESHOLD,
            logger_path: PathBuf::from(DEFAULT_LOGGER_FILENAME),
            exclusive_access: true,
            install_handlers: true,
        }
    }
}

impl ReclaimConfig {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.live_threshold == 0 {
            return Err(Error::configuration(
                "live_threshold must be greater than zero",
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(Error::configuration("log_filter must not be empty"));
        }
        Ok(())
    }
}
