//! Optional settings file merged with command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use kubekit_k8s::PollPolicy;
use kubekit_k8s::poll::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};

const CONFIG_DIR: &str = "kubekit";
const CONFIG_FILE: &str = "config.toml";

/// Values read from `config.toml`
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Context used when `--context` is not given
    pub context: Option<String>,
    /// Namespace used when `--namespace` is not given
    pub namespace: Option<String>,
    pub rollout: RolloutSettings,
    pub logs: LogSettings,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RolloutSettings {
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for RolloutSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            timeout_secs: DEFAULT_POLL_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    pub tail: Option<i64>,
}

impl Settings {
    /// `<config dir>/kubekit/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads `explicit`, which must exist, or the default file if present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        ensure!(
            settings.rollout.interval_secs > 0,
            "Invalid config file {}: rollout.interval_secs must be at least 1",
            path.display()
        );
        Ok(settings)
    }

    /// Flag value if given, else the configured context
    pub fn context(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.context.clone())
    }

    /// Flag value if given, else the configured namespace, else `fallback`
    pub fn namespace(&self, flag: Option<String>, fallback: &str) -> String {
        flag.or_else(|| self.namespace.clone())
            .filter(|ns| !ns.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Poll policy with per-invocation overrides in seconds
    pub fn poll_policy(&self, interval: Option<u64>, timeout: Option<u64>) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(interval.unwrap_or(self.rollout.interval_secs)),
            Duration::from_secs(timeout.unwrap_or(self.rollout.timeout_secs)),
        )
    }

    pub fn tail(&self, flag: Option<i64>) -> i64 {
        flag.or(self.logs.tail).unwrap_or(0)
    }
}
