//! Environment-driven configuration.
//!
//! All settings come from `WARDEN_*` environment variables, read once at
//! startup. The connection target and password are required; everything
//! else has a sensible default. Parsing is written against an injectable
//! lookup function so tests never mutate the process environment.

use std::time::Duration;

use warden_rcon::RconTarget;

const HOST_KEY: &str = "WARDEN_RCON_HOST";
const PORT_KEY: &str = "WARDEN_RCON_PORT";
const PASSWORD_KEY: &str = "WARDEN_RCON_PASSWORD";
const ALLOWED_KEY: &str = "WARDEN_ALLOWED_COMMANDS";
const FORBIDDEN_KEY: &str = "WARDEN_FORBIDDEN_COMMANDS";
const PERIOD_KEY: &str = "WARDEN_WATCHDOG_PERIOD_SECS";
const PROBE_TIMEOUT_KEY: &str = "WARDEN_PROBE_TIMEOUT_SECS";
const CONNECT_TIMEOUT_KEY: &str = "WARDEN_CONNECT_TIMEOUT_SECS";
const COMMAND_TIMEOUT_KEY: &str = "WARDEN_COMMAND_TIMEOUT_SECS";

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing environment variable: {0}")]
    Missing(&'static str),

    /// A variable is set but does not parse.
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the process needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// The RCON server to relay commands to.
    pub target: RconTarget,
    /// Allow-list of command names. Empty means "not configured".
    pub allowed_commands: Vec<String>,
    /// Deny-list of command names. Ignored when the allow-list is set.
    pub forbidden_commands: Vec<String>,
    /// How often the watchdog probes reachability.
    pub watchdog_period: Duration,
    /// Per-probe timeout for the watchdog.
    pub probe_timeout: Duration,
    /// Deadline for the optional connection attempt at startup.
    pub connect_timeout: Duration,
    /// Deadline applied to each relayed command.
    pub command_timeout: Duration,
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let host =
            lookup(HOST_KEY).ok_or(ConfigError::Missing(HOST_KEY))?;
        let port_raw =
            lookup(PORT_KEY).ok_or(ConfigError::Missing(PORT_KEY))?;
        let port = port_raw.parse::<u16>().map_err(|_| {
            ConfigError::Invalid {
                key: PORT_KEY,
                value: port_raw,
            }
        })?;
        let password = lookup(PASSWORD_KEY)
            .ok_or(ConfigError::Missing(PASSWORD_KEY))?;

        Ok(Self {
            target: RconTarget {
                host,
                port,
                password,
            },
            allowed_commands: list(lookup(ALLOWED_KEY)),
            forbidden_commands: list(lookup(FORBIDDEN_KEY)),
            watchdog_period: seconds(&lookup, PERIOD_KEY, 60)?,
            probe_timeout: seconds(&lookup, PROBE_TIMEOUT_KEY, 3)?,
            connect_timeout: seconds(&lookup, CONNECT_TIMEOUT_KEY, 5)?,
            command_timeout: seconds(&lookup, COMMAND_TIMEOUT_KEY, 10)?,
        })
    }
}

/// Splits a comma-separated list, trimming entries and dropping empties.
fn list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Reads a whole-seconds duration, falling back to a default when unset.
fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    match lookup(key) {
        None => Ok(Duration::from_secs(default_secs)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
