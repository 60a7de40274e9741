use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest accepted value for the `*_secs` durations; larger ones cannot be represented as a
/// signed millisecond count.
pub const MAX_DURATION_SECS: u64 = i64::MAX as u64 / 1000;

/// Command-line surface of the daemon.
///
/// Every flag is optional. Values given here win over the configuration file, which in
/// turn wins over the built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "conn-nanny")]
#[command(version)]
#[command(about = "Terminates TCP connections that outlive a maximum age")]
pub struct CommandLine {
    /// TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Seconds to sleep between two polling cycles
    #[arg(long, env = "CONN_NANNY_INTERVAL")]
    pub interval: Option<u64>,

    /// Maximum age in seconds an established connection may reach
    #[arg(long, env = "CONN_NANNY_MAX_AGE")]
    pub max_age: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub once: bool,
}

/// Runtime configuration of the monitor.
///
/// # Fields Overview
///
/// - `monitor_interval_secs`: sleep between the end of a cycle and the next poll
/// - `max_connection_age_secs`: connections strictly older than this are evicted
/// - `enumerator`: how established connections are listed, see [`EnumeratorConfig`]
/// - `terminator`: how a connection is reset, see [`TerminatorConfig`]
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub monitor_interval_secs: u64,
    pub max_connection_age_secs: u64,
    pub enumerator: EnumeratorConfig,
    pub terminator: TerminatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor_interval_secs: 30,
            max_connection_age_secs: 300,
            enumerator: EnumeratorConfig::default(),
            terminator: TerminatorConfig::default(),
        }
    }
}

impl Config {
    /// Reads and validates a TOML configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration from the command line: file first (or
    /// defaults), then flag and environment overrides.
    pub fn load(args: &CommandLine) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(interval) = args.interval {
            config.monitor_interval_secs = interval;
        }
        if let Some(max_age) = args.max_age {
            config.max_connection_age_secs = max_age;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor_interval_secs == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "monitor_interval_secs must be greater than 0",
            )));
        }
        if self.max_connection_age_secs == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "max_connection_age_secs must be greater than 0",
            )));
        }
        for (key, value) in [
            ("monitor_interval_secs", self.monitor_interval_secs),
            ("max_connection_age_secs", self.max_connection_age_secs),
            ("enumerator.timeout_secs", self.enumerator.timeout_secs),
            ("terminator.window_secs", self.terminator.window_secs),
        ] {
            if value > MAX_DURATION_SECS {
                return Err(ConfigError::NotInRange(format!(
                    "{} must not exceed {}",
                    key, MAX_DURATION_SECS
                )));
            }
        }
        if self.enumerator.timeout_secs == 0 {
            return Err(ConfigError::NotInRange(String::from(
                "enumerator.timeout_secs must be greater than 0",
            )));
        }

        let e = &self.enumerator;
        if e.state_column == e.local_column
            || e.state_column == e.peer_column
            || e.local_column == e.peer_column
        {
            return Err(ConfigError::BadColumns(format!(
                "state ({}), local ({}) and peer ({}) columns must differ",
                e.state_column, e.local_column, e.peer_column
            )));
        }

        if e.program.trim().is_empty() {
            return Err(ConfigError::EmptyValue(String::from("enumerator.program")));
        }
        if e.established_marker.trim().is_empty() {
            return Err(ConfigError::EmptyValue(String::from(
                "enumerator.established_marker",
            )));
        }
        if self.terminator.program.trim().is_empty() {
            return Err(ConfigError::EmptyValue(String::from("terminator.program")));
        }

        Ok(())
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    pub fn max_connection_age(&self) -> Result<chrono::Duration, ConfigError> {
        i64::try_from(self.max_connection_age_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                ConfigError::NotInRange(format!(
                    "max_connection_age_secs {} is too large",
                    self.max_connection_age_secs
                ))
            })
    }
}
