//! Harness configuration
//!
//! Loaded once per process from YAML, with environment overrides, and kept read-only in
//! a process-wide cell afterwards.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use action_flow::RetryPolicy;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides `retries.step_retry`
pub const ENV_STEP_RETRY: &str = "SOULHARNESS_STEP_RETRY";
/// Overrides `healing.ledger_path`
pub const ENV_LEDGER_PATH: &str = "SOULHARNESS_LEDGER_PATH";
/// Overrides `diagnostics.dir`
pub const ENV_DIAGNOSTICS_DIR: &str = "SOULHARNESS_DIAGNOSTICS_DIR";

const LOCAL_CONFIG: &str = "config/config.yaml";

static GLOBAL: OnceCell<HarnessConfig> = OnceCell::new();

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt of every action
    pub step_retry: u32,
    pub backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            step_retry: 2,
            backoff_ms: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// How long page helpers wait for an element before interacting
    pub element_wait_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            element_wait_ms: 10_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealingSettings {
    pub ledger_path: PathBuf,
}

impl Default for HealingSettings {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("reports/healing_log.json"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    pub dir: PathBuf,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports/diagnostics"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level when neither `RUST_LOG` nor `--log-level` is given
    pub level: Option<String>,

    /// Directory for daily-rolling log files; console only when unset
    pub dir: Option<PathBuf>,
}

/// Top-level configuration (`config/config.yaml`)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub retries: RetrySettings,
    pub timeouts: TimeoutSettings,
    pub healing: HealingSettings,
    pub diagnostics: DiagnosticsSettings,
    pub logging: LoggingSettings,
}

impl HarnessConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries.step_retry)
            .with_backoff(Duration::from_millis(self.retries.backoff_ms))
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_millis(self.timeouts.element_wait_ms)
    }

    /// Apply `SOULHARNESS_*` environment overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(raw) = env_value(ENV_STEP_RETRY) {
            self.retries.step_retry = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_STEP_RETRY,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = env_value(ENV_LEDGER_PATH) {
            self.healing.ledger_path = PathBuf::from(raw);
        }
        if let Some(raw) = env_value(ENV_DIAGNOSTICS_DIR) {
            self.diagnostics.dir = PathBuf::from(raw);
        }
        Ok(())
    }
}

fn env_value(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Where the effective configuration came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => f.write_str("built-in defaults"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: HarnessConfig,
    pub source: ConfigSource,
}

/// Config file to read: the explicit path, then `./config/config.yaml`, then
/// `<config_dir>/soulharness/config.yaml`
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("soulharness").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load configuration and apply environment overrides.
///
/// An explicit path that cannot be read is an error; without one, a missing file means
/// defaults.
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let (mut config, source) = match resolve_path(explicit) {
        Some(path) => {
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let config = if raw.trim().is_empty() {
                HarnessConfig::default()
            } else {
                HarnessConfig::from_yaml(&raw).map_err(|source| ConfigError::Parse {
                    path: path.clone(),
                    source,
                })?
            };
            (config, ConfigSource::File(path))
        }
        None => (HarnessConfig::default(), ConfigSource::Defaults),
    };
    config.apply_env_overrides()?;
    Ok(LoadedConfig { config, source })
}

/// Install the process-wide configuration. The first call wins.
pub fn init(config: HarnessConfig) -> &'static HarnessConfig {
    GLOBAL.get_or_init(|| config)
}

/// Process-wide configuration, defaults when `init` was never called
pub fn global() -> &'static HarnessConfig {
    GLOBAL.get_or_init(HarnessConfig::default)
}
