//! Configuration loader for reclaim
//!
//! Resolution order, lowest to highest precedence:
//! defaults, the JSON file, then `RECLAIM_*` environment variables.

use crate::config::ReclaimConfig;
use reclaim_core::{
    constants::{
        CONFIG_FILENAME, RECLAIM_CONFIG_VAR, RECLAIM_LIVE_THRESHOLD_VAR, RECLAIM_LOGGER_PATH_VAR,
        RECLAIM_LOG_VAR,
    },
    Error, Result, ResultExt,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader {
    /// Explicit configuration file; must exist when set
    file: Option<PathBuf>,
    /// Directory searched for `reclaim.json`; absence is not an error
    directory: Option<PathBuf>,
    /// Whether `RECLAIM_*` variables override file values
    env_overrides: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            file: None,
            directory: None,
            env_overrides: true,
        }
    }

    /// Load from this JSON file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Look for `reclaim.json` in this directory
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Set whether environment variables override file values
    pub fn env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    /// Load the configuration using the process environment
    pub fn load(self) -> Result<ReclaimConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load the configuration, reading variables through `lookup`
    pub fn load_with_env<F>(self, lookup: F) -> Result<ReclaimConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = self.file.clone().or_else(|| {
            if self.env_overrides {
                lookup(RECLAIM_CONFIG_VAR).map(PathBuf::from)
            } else {
                None
            }
        });

        let mut config = match explicit {
            Some(path) => read_file(&path)?,
            None => match self.directory.as_ref().map(|d| d.join(CONFIG_FILENAME)) {
                Some(candidate) if candidate.is_file() => read_file(&candidate)?,
                Some(candidate) => {
                    tracing::debug!(path = %candidate.display(), "no configuration file, using defaults");
                    ReclaimConfig::default()
                }
                None => ReclaimConfig::default(),
            },
        };

        if self.env_overrides {
            apply_env(&mut config, &lookup)?;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<ReclaimConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read configuration", e))
        .with_context(|| format!("configuration file {} unavailable", path.display()))?;

    tracing::debug!(path = %path.display(), "loaded configuration file");
    ReclaimConfig::from_json(&content)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

fn apply_env<F>(config: &mut ReclaimConfig, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(filter) = lookup(RECLAIM_LOG_VAR) {
        config.log_filter = filter;
    }

    if let Some(raw) = lookup(RECLAIM_LIVE_THRESHOLD_VAR) {
        config.live_threshold = raw.trim().parse().map_err(|e| {
            Error::configuration(format!(
                "{RECLAIM_LIVE_THRESHOLD_VAR} must be a positive integer, got '{raw}': {e}"
            ))
        })?;
    }

    if let Some(path) = lookup(RECLAIM_LOGGER_PATH_VAR) {
        config.logger_path = PathBuf::from(path);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigLoader::new().load_with_env(env(&[])).unwrap();
        assert_eq!(config, ReclaimConfig::default());
    }

    #[test]
    fn test_directory_file_is_read() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILENAME),
            r#"{"live_threshold": 10, "exclusive_access": false}"#,
        )
        .unwrap();

        let config = ConfigLoader::new()
            .directory(temp_dir.path())
            .load_with_env(env(&[]))
            .unwrap();

        assert_eq!(config.live_threshold, 10);
        assert!(!config.exclusive_access);
    }

    #[test]
    fn test_missing_directory_file_is_fine() {
        let temp_dir = TempDir::new().unwrap();
        let config = ConfigLoader::new()
            .directory(temp_dir.path())
            .load_with_env(env(&[]))
            .unwrap();
        assert_eq!(config, ReclaimConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = ConfigLoader::new()
            .file(temp_dir.path().join("absent.json"))
            .load_with_env(env(&[]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.json");
        fs::write(&path, r#"{"live_threshold": 10, "log_filter": "warn"}"#).unwrap();

        let config = ConfigLoader::new()
            .file(&path)
            .load_with_env(env(&[
                (RECLAIM_LIVE_THRESHOLD_VAR, "25"),
                (RECLAIM_LOGGER_PATH_VAR, "/var/tmp/zoo.log"),
            ]))
            .unwrap();

        assert_eq!(config.live_threshold, 25);
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.logger_path, PathBuf::from("/var/tmp/zoo.log"));
    }

    #[test]
    fn test_config_var_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("from_env.json");
        fs::write(&path, r#"{"log_filter": "debug"}"#).unwrap();

        let config = ConfigLoader::new()
            .load_with_env(env(&[(RECLAIM_CONFIG_VAR, path.to_str().unwrap())]))
            .unwrap();
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_env_overrides_disabled() {
        let config = ConfigLoader::new()
            .env_overrides(false)
            .load_with_env(env(&[(RECLAIM_LOG_VAR, "trace")]))
            .unwrap();
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_bad_threshold_is_error() {
        let err = ConfigLoader::new()
            .load_with_env(env(&[(RECLAIM_LIVE_THRESHOLD_VAR, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains(RECLAIM_LIVE_THRESHOLD_VAR));

        let err = ConfigLoader::new()
            .load_with_env(env(&[(RECLAIM_LIVE_THRESHOLD_VAR, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    #[serial]
    fn test_load_reads_process_environment() {
        std::env::set_var(RECLAIM_LOG_VAR, "reclaim_resource=debug");
        let result = ConfigLoader::new().load();
        std::env::remove_var(RECLAIM_LOG_VAR);

        assert_eq!(result.unwrap().log_filter, "reclaim_resource=debug");
    }
}
