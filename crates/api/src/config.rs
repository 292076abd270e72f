use std::str::FromStr;
use std::time::Duration;

use helios_core::progress::ProgressWeighting;

/// Default interval between background progress sweeps: one day.
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 86_400;

/// A malformed configuration value.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds between background progress sweeps; `0` disables the sweep.
    pub progress_sweep_interval_secs: u64,
    /// How milestones count toward project progress.
    pub progress_weighting: ProgressWeighting,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `3000`                  |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `PROGRESS_SWEEP_INTERVAL_SECS` | `86400`                 |
    /// | `PROGRESS_WEIGHTING`           | `count`                 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = parse(&lookup, "PORT", "u16", 3000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse(&lookup, "REQUEST_TIMEOUT_SECS", "u64", 30)?;
        let progress_sweep_interval_secs = parse(
            &lookup,
            "PROGRESS_SWEEP_INTERVAL_SECS",
            "u64",
            DEFAULT_SWEEP_INTERVAL_SECS,
        )?;

        let progress_weighting = match lookup("PROGRESS_WEIGHTING") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PROGRESS_WEIGHTING",
                expected: "weighting ('count' or 'weighted')",
                value,
            })?,
            None => ProgressWeighting::default(),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            progress_sweep_interval_secs,
            progress_weighting,
        })
    }

    /// The sweep interval, or `None` when the sweep is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.progress_sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.progress_sweep_interval_secs))
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
        None => Ok(default),
    }
}
