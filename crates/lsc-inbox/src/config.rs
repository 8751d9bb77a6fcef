//! Configuration management for lsc-inbox.
//!
//! Configuration is layered with figment: defaults, then a TOML file, then
//! environment variables.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::dashboard::Filter;
use crate::error::{Error, Result};
use crate::store::StorageKeys;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "lsc-inbox";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "storage.db";

/// Prefix for environment overrides, e.g. `LSC_INBOX_DASHBOARD__LIST_LIMIT=20`.
const ENV_PREFIX: &str = "LSC_INBOX_";

/// Application configuration.
///
/// Loaded from (highest precedence first):
/// 1. Environment variables prefixed with `LSC_INBOX_`, sections split on `__`
/// 2. TOML config file at `~/.config/lsc-inbox/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Dashboard configuration.
    pub dashboard: DashboardConfig,
}

/// Where and under which keys submissions are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/lsc-inbox/storage.db`
    pub database_path: Option<PathBuf>,
    /// Key names inside the database.
    pub keys: StorageKeys,
}

/// Dashboard behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Filter used by `list` when none is given.
    pub default_filter: Filter,
    /// Ask before delete and clear unless `--yes` is passed.
    pub confirm_destructive: bool,
    /// Maximum rows `list` prints. 0 for unlimited.
    pub list_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_filter: Filter::All,
            confirm_destructive: true,
            list_limit: 0,
        }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&config_file))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Extract and validate a configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage key is empty or two keys collide.
    pub fn validate(&self) -> Result<()> {
        let keys = &self.storage.keys;
        let named = [
            ("submissions", &keys.submissions),
            ("admin", &keys.admin),
            ("quarantine", &keys.quarantine),
        ];

        for (name, key) in &named {
            if key.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("storage.keys.{name} must not be empty"),
                });
            }
        }

        for (i, (name, key)) in named.iter().enumerate() {
            if let Some((other, _)) = named[i + 1..].iter().find(|(_, k)| k == key) {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "storage.keys.{name} and storage.keys.{other} are both '{key}'"
                    ),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.storage.keys.submissions, "site_submissions");
        assert_eq!(config.storage.keys.admin, "admin_authenticated");
        assert_eq!(config.dashboard.default_filter, Filter::All);
        assert!(config.dashboard.confirm_destructive);
        assert_eq!(config.dashboard.list_limit, 0);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_key() {
        let mut config = Config::default();
        config.storage.keys.admin = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("storage.keys.admin"));
    }

    #[test]
    fn test_validate_duplicate_keys() {
        let mut config = Config::default();
        config.storage.keys.quarantine = config.storage.keys.submissions.clone();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("submissions"));
        assert!(err.contains("quarantine"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("lsc-inbox"));
        assert!(path.to_string_lossy().ends_with("storage.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("lsc-inbox"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Missing file falls back to defaults
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
database_path = "/tmp/inbox.db"

[storage.keys]
submissions = "subs"

[dashboard]
default_filter = "staff-application"
confirm_destructive = false
list_limit = 25
"#,
        )
        .unwrap();

        let config = Config::from_figment(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(&path)),
        )
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/inbox.db"));
        assert_eq!(config.storage.keys.submissions, "subs");
        assert_eq!(config.storage.keys.admin, "admin_authenticated");
        assert_eq!(config.dashboard.default_filter, Filter::StaffApplication);
        assert!(!config.dashboard.confirm_destructive);
        assert_eq!(config.dashboard.list_limit, 25);
    }

    #[test]
    fn test_from_figment_rejects_invalid() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Serialized::default("storage.keys.admin", ""));

        let err = Config::from_figment(figment).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_from_figment_rejects_unknown_filter() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Serialized::default("dashboard.default_filter", "everything"));

        let err = Config::from_figment(figment).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("site_submissions"));
        assert!(json.contains("confirm_destructive"));
    }
}
