//! Process configuration read from the environment (and `.env`).

use std::net::SocketAddr;

use thiserror::Error;

use procura_infra::NotificationConfig;
use procura_infra::jobs::RetryPolicy;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime configuration of the API process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// `true` when no `JWT_SECRET` was provided.
    pub insecure_jwt_secret: bool,
    pub admin_email: Option<String>,
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Load `.env` (if present), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: SocketAddr = parse(
            "PROCURA_BIND_ADDR",
            get("PROCURA_BIND_ADDR"),
            "0.0.0.0:8080".parse().ok(),
            "a socket address",
        )?;

        let (jwt_secret, insecure_jwt_secret) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let defaults = NotificationConfig::default();
        let workers: usize = parse(
            "PROCURA_NOTIFY_WORKERS",
            get("PROCURA_NOTIFY_WORKERS"),
            Some(defaults.workers),
            "a positive integer",
        )?;
        let queue_capacity: usize = parse(
            "PROCURA_NOTIFY_QUEUE_CAPACITY",
            get("PROCURA_NOTIFY_QUEUE_CAPACITY"),
            Some(defaults.queue_capacity),
            "a positive integer",
        )?;
        let max_attempts: u32 = parse(
            "PROCURA_NOTIFY_MAX_ATTEMPTS",
            get("PROCURA_NOTIFY_MAX_ATTEMPTS"),
            Some(defaults.retry.max_attempts),
            "a positive integer",
        )?;

        if workers == 0 {
            return Err(invalid("PROCURA_NOTIFY_WORKERS", "a positive integer", "0"));
        }
        if max_attempts == 0 {
            return Err(invalid("PROCURA_NOTIFY_MAX_ATTEMPTS", "a positive integer", "0"));
        }

        let notifications = NotificationConfig {
            from_email: get("PROCURA_FROM_EMAIL").unwrap_or(defaults.from_email),
            workers,
            queue_capacity,
            retry: RetryPolicy {
                max_attempts,
                ..defaults.retry
            },
            poll_interval: defaults.poll_interval,
            dead_letter_capacity: defaults.dead_letter_capacity,
            drain_timeout: defaults.drain_timeout,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            insecure_jwt_secret,
            admin_email: get("PROCURA_ADMIN_EMAIL"),
            notifications,
        })
    }
}

fn parse<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: Option<T>,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| invalid(var, expected, &value)),
        None => default.ok_or_else(|| invalid(var, expected, "")),
    }
}

fn invalid(var: &'static str, expected: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        var,
        expected,
        value: value.to_string(),
    }
}
