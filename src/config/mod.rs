use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::utils::persistence::write_atomic;

const DEFAULT_DIR_NAME: &str = ".money_core";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "MONEY_CORE_HOME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Data file used by the JSON backend, relative to the application directory.
    pub data_file: String,
    /// Default tracing directive; `RUST_LOG` overrides it.
    pub log_filter: String,
    /// Whether statement matching looks at the transaction date only.
    #[serde(default = "default_ignore_execution_date")]
    pub ignore_execution_date: bool,
}

fn default_ignore_execution_date() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: "money.json".into(),
            log_filter: "money_core=info".into(),
            ignore_execution_date: default_ignore_execution_date(),
        }
    }
}

/// Returns the application data directory, defaulting to `~/.money_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let base = base.into();
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Absolute location of the configured data file.
    pub fn data_path(&self, config: &Config) -> PathBuf {
        let file = Path::new(&config.data_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.base.join(file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert!(config.ignore_execution_date);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        let config = Config {
            data_file: "household.json".into(),
            log_filter: "money_core=debug".into(),
            ignore_execution_date: false,
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(
            manager.data_path(&config),
            temp.path().join("household.json")
        );
    }

    #[test]
    fn older_files_without_matching_flag_default_to_ignoring_execution_date() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path()).unwrap();
        fs::write(
            manager.path(),
            r#"{"data_file":"money.json","log_filter":"money_core=warn"}"#,
        )
        .unwrap();
        assert!(manager.load().unwrap().ignore_execution_date);
    }
}
