//! Environment-driven server configuration.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use regression_facade::EngineConfig;
use thiserror::Error;

/// Invalid environment value.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("{name} must be {expected}, got '{value}'")]
pub struct ConfigError {
    pub name: &'static str,
    pub expected: &'static str,
    pub value: String,
}

/// Settings read from the process environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Newest entries kept per history category
    pub history_limit: usize,
    /// Fixed seed for splits and randomised models; unset draws from entropy
    pub seed: Option<u64>,
    /// Worker pool size; unset uses one thread per logical CPU
    pub worker_threads: Option<usize>,
    /// Per-request evaluation timeout; unset waits indefinitely
    pub evaluation_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            history_limit: 100,
            seed: None,
            worker_threads: None,
            evaluation_timeout: None,
        }
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError {
            name,
            expected,
            value: raw,
        }),
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `HISTORY_LIMIT`, `REGRESSION_SEED`,
    /// `WORKER_THREADS` and `EVALUATION_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse(&lookup, "PORT", "a valid port number")?.unwrap_or(defaults.port),
            history_limit: parse::<usize>(&lookup, "HISTORY_LIMIT", "a positive integer")?
                .map_or(defaults.history_limit, |limit| limit.max(1)),
            seed: parse(&lookup, "REGRESSION_SEED", "an unsigned integer")?,
            worker_threads: parse(&lookup, "WORKER_THREADS", "a positive integer")?,
            evaluation_timeout: parse(&lookup, "EVALUATION_TIMEOUT_SECS", "a number of seconds")?
                .map(Duration::from_secs),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError {
                name: "HOST",
                expected: "an IP address",
                value: self.host.clone(),
            })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default().seed(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.addr().unwrap().port(), 8080);
        assert_eq!(config.engine_config().seed, None);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("HISTORY_LIMIT", "5"),
            ("REGRESSION_SEED", "42"),
            ("WORKER_THREADS", "3"),
            ("EVALUATION_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:9000");
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.worker_threads, Some(3));
        assert_eq!(config.evaluation_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.engine_config().seed, Some(42));
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err.name, "PORT");
        assert_eq!(
            err.to_string(),
            "PORT must be a valid port number, got 'eighty'"
        );
    }

    #[test]
    fn test_zero_history_limit_is_clamped() {
        let config = ServerConfig::from_lookup(lookup(&[("HISTORY_LIMIT", "0")])).unwrap();
        assert_eq!(config.history_limit, 1);
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig::from_lookup(lookup(&[("HOST", "not a host")])).unwrap();
        assert!(config.addr().is_err());
    }
}
