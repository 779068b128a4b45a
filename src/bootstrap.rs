use crate::service::{Service, ServiceBuilder};
use std::net::SocketAddr;
use std::num::{NonZeroU64, NonZeroUsize};
use std::str::FromStr;
use std::time::Duration;

pub const BIND_ADDR_VAR: &str = "ROSTER_BIND_ADDR";
pub const RETENTION_VAR: &str = "ROSTER_SESSION_RETENTION_SECS";
pub const REAP_INTERVAL_VAR: &str = "ROSTER_REAP_INTERVAL_SECS";
pub const MAX_CONCURRENT_RUNS_VAR: &str = "ROSTER_MAX_CONCURRENT_RUNS";

#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: {value:?}")]
pub struct ConfigurationError {
    name: &'static str,
    value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub bind_addr: SocketAddr,
    pub session_retention: Duration,
    pub reap_interval: Duration,
    pub max_concurrent_runs: usize,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            session_retention: Duration::from_secs(3600),
            reap_interval: Duration::from_secs(60),
            max_concurrent_runs: 4,
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigurationError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigurationError { name, value }),
    }
}

impl Configuration {
    /// Reads the configuration from the process environment, after loading `.env.local` if present.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenv::from_filename(".env.local").ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Missing variables keep their defaults; malformed ones are errors.
    ///
    /// The reap interval and the run limit must be positive.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        Ok(Self {
            bind_addr: parse(&lookup, BIND_ADDR_VAR)?.unwrap_or(defaults.bind_addr),
            session_retention: parse(&lookup, RETENTION_VAR)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_retention),
            reap_interval: parse::<NonZeroU64>(&lookup, REAP_INTERVAL_VAR)?
                .map(|secs| Duration::from_secs(secs.get()))
                .unwrap_or(defaults.reap_interval),
            max_concurrent_runs: parse::<NonZeroUsize>(&lookup, MAX_CONCURRENT_RUNS_VAR)?
                .map(NonZeroUsize::get)
                .unwrap_or(defaults.max_concurrent_runs),
        })
    }
}

/// A service builder carrying the session settings of `config`.
pub fn bootstrap(config: &Configuration) -> ServiceBuilder {
    Service::builder()
        .with_retention(config.session_retention)
        .with_max_concurrent_runs(config.max_concurrent_runs)
}
