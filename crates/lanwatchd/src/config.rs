//! Daemon configuration.
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. TOML file (`--config`, or `<config_dir>/lanwatch/config.toml` if present)
//! 3. Environment (`LANWATCH_*`)
//! 4. Command-line flags, applied by the binary
//!
//! ```toml
//! bind = "0.0.0.0:5000"
//! data_file = "/var/lib/lanwatch/devices.json"
//! seed_defaults = true
//!
//! [probe]
//! timeout_ms = 1200
//! method = "command"
//! min_workers = 4
//! max_workers = 64
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinator::{CoordinatorConfig, DEFAULT_MAX_WORKERS, DEFAULT_MIN_WORKERS};
use crate::probe::{ProbeMethod, DEFAULT_PROBE_TIMEOUT};

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

pub const ENV_BIND: &str = "LANWATCH_BIND";
pub const ENV_DATA: &str = "LANWATCH_DATA";
pub const ENV_PROBE_TIMEOUT_MS: &str = "LANWATCH_PROBE_TIMEOUT_MS";
pub const ENV_PROBE_METHOD: &str = "LANWATCH_PROBE_METHOD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Probe round settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub timeout_ms: u64,
    pub method: ProbeMethod,
    pub min_workers: usize,
    pub max_workers: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            method: ProbeMethod::default(),
            min_workers: DEFAULT_MIN_WORKERS,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            timeout: self.timeout(),
            min_workers: self.min_workers,
            max_workers: self.max_workers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub bind: SocketAddr,
    pub data_file: PathBuf,
    /// Write the built-in devices when no data file exists yet.
    pub seed_defaults: bool,
    pub probe: ProbeConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            data_file: default_data_file(),
            seed_defaults: true,
            probe: ProbeConfig::default(),
        }
    }
}

/// `<state_dir>/lanwatch/devices.json`, or `./devices.json` where the
/// platform has no state directory.
pub fn default_data_file() -> PathBuf {
    dirs::state_dir()
        .map(|dir| dir.join("lanwatch").join("devices.json"))
        .unwrap_or_else(|| PathBuf::from("devices.json"))
}

/// `<config_dir>/lanwatch/config.toml`.
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lanwatch").join("config.toml"))
}

impl DaemonConfig {
    /// Loads file and environment layers.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_file().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `LANWATCH_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BIND) {
            self.bind = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_BIND,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_DATA).filter(|v| !v.trim().is_empty()) {
            self.data_file = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_PROBE_TIMEOUT_MS) {
            self.probe.timeout_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_PROBE_TIMEOUT_MS,
                value,
            })?;
        }
        if let Some(value) = lookup(ENV_PROBE_METHOD) {
            self.probe.method = value.parse().map_err(|_| ConfigError::InvalidEnv {
                key: ENV_PROBE_METHOD,
                value,
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe.timeout_ms == 0 {
            return Err(ConfigError::Invalid("probe.timeout_ms must be positive".into()));
        }
        if self.probe.min_workers == 0 {
            return Err(ConfigError::Invalid("probe.min_workers must be positive".into()));
        }
        if self.probe.min_workers > self.probe.max_workers {
            return Err(ConfigError::Invalid(format!(
                "probe.min_workers ({}) exceeds probe.max_workers ({})",
                self.probe.min_workers, self.probe.max_workers
            )));
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_file must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert!(config.seed_defaults);
        assert_eq!(config.probe.timeout(), Duration::from_millis(1200));
        assert_eq!(config.probe.method, ProbeMethod::Command);
        assert!(config.data_file.ends_with("devices.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DaemonConfig::from_toml(
            r#"
            bind = "127.0.0.1:8080"

            [probe]
            method = "icmp"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.probe.method, ProbeMethod::Icmp);
        assert_eq!(config.probe.timeout_ms, 1200);
        assert_eq!(config.probe.max_workers, 64);
        assert!(config.seed_defaults);
    }

    #[test]
    fn test_unknown_method_rejected() {
        assert!(DaemonConfig::from_toml("[probe]\nmethod = \"arp\"").is_err());
    }

    #[test]
    fn test_from_file_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = DaemonConfig::from_file(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("nope.toml"));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "bind = ").unwrap();
        assert!(matches!(
            DaemonConfig::from_file(&broken).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = DaemonConfig::from_toml("bind = \"127.0.0.1:8080\"").unwrap();
        config
            .apply_env(env(&[
                (ENV_BIND, "127.0.0.1:9000"),
                (ENV_DATA, "/tmp/lanwatch/devices.json"),
                (ENV_PROBE_TIMEOUT_MS, "500"),
                (ENV_PROBE_METHOD, "icmp"),
            ]))
            .unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.data_file, PathBuf::from("/tmp/lanwatch/devices.json"));
        assert_eq!(config.probe.timeout_ms, 500);
        assert_eq!(config.probe.method, ProbeMethod::Icmp);
    }

    #[test]
    fn test_env_invalid_values() {
        let mut config = DaemonConfig::default();
        let err = config
            .apply_env(env(&[(ENV_BIND, "not-an-address")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: ENV_BIND, .. }));

        let err = config
            .apply_env(env(&[(ENV_PROBE_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: ENV_PROBE_TIMEOUT_MS,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_bad_probe_settings() {
        let mut config = DaemonConfig::default();
        config.probe.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = DaemonConfig::default();
        config.probe.min_workers = 0;
        assert!(config.validate().is_err());

        let mut config = DaemonConfig::default();
        config.probe.min_workers = 65;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_coordinator_config() {
        let mut config = ProbeConfig::default();
        config.timeout_ms = 250;
        config.max_workers = 16;

        let coordinator = config.coordinator_config();
        assert_eq!(coordinator.timeout, Duration::from_millis(250));
        assert_eq!(coordinator.worker_count(100), 16);
    }
}
