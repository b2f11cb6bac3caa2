/*!
 * Configuration types for Hydrate
 */

use hydrate_connect::{ConnectionPolicy, ReadPreference, WriteConcern};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{HydrateError, Result};

/// Where the member endpoints of the application come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipSource {
    /// A membership file, re-read on every resolution
    File { path: PathBuf },

    /// A fixed endpoint list
    Static { endpoints: Vec<String> },
}

impl Default for MembershipSource {
    fn default() -> Self {
        MembershipSource::Static {
            endpoints: vec![format!("localhost:{}", hydrate_core_discovery::DEFAULT_PORT)],
        }
    }
}

/// Main configuration for a managed database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrateConfig {
    /// Application name registered with the membership service
    pub application: String,

    /// Database the managed resources live in
    pub database: String,

    /// Membership source for the application's servers
    #[serde(default)]
    pub membership: MembershipSource,

    /// Read preference for newly built connections
    #[serde(default)]
    pub read_preference: ReadPreference,

    /// Write concern for newly built connections
    #[serde(default)]
    pub write_concern: WriteConcern,

    /// Per-server connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Delay between membership checks in `watch` mode
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stdout)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for HydrateConfig {
    fn default() -> Self {
        Self {
            application: "default".to_string(),
            database: "test".to_string(),
            membership: MembershipSource::default(),
            read_preference: ReadPreference::Primary,
            write_concern: WriteConcern::Acknowledged,
            connect_timeout_secs: default_connect_timeout(),
            refresh_interval_secs: default_refresh_interval(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_connect_timeout() -> u64 {
    5
}

fn default_refresh_interval() -> u64 {
    10
}

impl HydrateConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            HydrateError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: HydrateConfig = toml::from_str(&contents)
            .map_err(|e| HydrateError::Config(format!("Invalid {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| HydrateError::Serialization(e.to_string()))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Platform config location: `<config dir>/hydrate/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hydrate").join("config.toml"))
    }

    /// Reject configurations the manager cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.application.trim().is_empty() {
            return Err(HydrateError::Config("application must not be empty".into()));
        }
        if self.database.trim().is_empty() {
            return Err(HydrateError::Config("database must not be empty".into()));
        }
        if self.connect_timeout_secs == 0 {
            return Err(HydrateError::Config(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(HydrateError::Config(
                "refresh_interval_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Policy handed to the manager for new connections
    pub fn policy(&self) -> ConnectionPolicy {
        ConnectionPolicy::new(self.read_preference, self.write_concern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = HydrateConfig::default();
        assert_eq!(config.read_preference, ReadPreference::Primary);
        assert_eq!(config.write_concern, WriteConcern::Acknowledged);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let toml_str = r#"
application = "orders"
database = "shop"
"#;
        let config: HydrateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.application, "orders");
        assert_eq!(config.membership, MembershipSource::default());
        assert_eq!(config.refresh_interval_secs, 10);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_readme_config_example() {
        let toml_str = r#"
application = "orders"
database = "shop"
read_preference = "secondary_preferred"
write_concern = "majority"
connect_timeout_secs = 2
refresh_interval_secs = 30
log_level = "debug"
log_file = "/var/log/hydrate.log"

[membership.file]
path = "/etc/hydrate/members.toml"
"#;

        let config: HydrateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.read_preference, ReadPreference::SecondaryPreferred);
        assert_eq!(config.write_concern, WriteConcern::Majority);
        assert_eq!(config.connect_timeout_secs, 2);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/hydrate.log")));
        assert_eq!(
            config.membership,
            MembershipSource::File {
                path: PathBuf::from("/etc/hydrate/members.toml")
            }
        );
        assert_eq!(
            config.policy(),
            ConnectionPolicy::new(ReadPreference::SecondaryPreferred, WriteConcern::Majority)
        );
    }

    #[test]
    fn test_static_membership_source() {
        let toml_str = r#"
application = "orders"
database = "shop"

[membership.static]
endpoints = ["db1:27017", "db2:27017"]
"#;
        let config: HydrateConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.membership,
            MembershipSource::Static { ref endpoints } if endpoints.len() == 2
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = HydrateConfig {
            application: "orders".to_string(),
            database: "shop".to_string(),
            read_preference: ReadPreference::Nearest,
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let loaded = HydrateConfig::from_file(&path).unwrap();
        assert_eq!(loaded.application, "orders");
        assert_eq!(loaded.read_preference, ReadPreference::Nearest);
    }

    #[test]
    fn test_validation() {
        let config = HydrateConfig {
            application: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(HydrateError::Config(_))));

        let config = HydrateConfig {
            connect_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = HydrateConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, HydrateError::Config(_)));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Trace.to_tracing_level(), tracing::Level::TRACE);
    }
}
