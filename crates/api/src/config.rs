//! Process configuration, read once from the environment at startup.

use std::time::Duration;

use thiserror::Error;

use taskhub_notify::{BackoffStrategy, MailerConfig, RetryPolicy};

use crate::cors::{AllowedOrigins, DEV_ORIGINS};

pub const DEFAULT_PORT: u16 = 5000;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} is invalid: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Immutable application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Production frontend origin (`FRONTEND_URL`); also the base of emailed links.
    pub frontend_url: Option<String>,
    /// Postgres connection string (`DATABASE_URL`); unset means in-memory storage.
    pub database_url: Option<String>,
    pub db_acquire_timeout: Duration,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl: chrono::Duration,
    pub verification_ttl: chrono::Duration,
    pub mailer: MailerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let mailer = MailerConfig {
            api_key: get("SEND_GRID_API"),
            from_address: get("FROM_EMAIL").unwrap_or_default(),
            timeout: Duration::from_secs(number(&get, "EMAIL_TIMEOUT_SECS", 10)?),
            retry: retry_policy(&get)?,
        };

        Ok(Self {
            frontend_url: get("FRONTEND_URL").map(|u| u.trim().to_string()),
            database_url: get("DATABASE_URL"),
            db_acquire_timeout: Duration::from_secs(number(&get, "DATABASE_TIMEOUT_SECS", 5)?),
            port: number(&get, "PORT", DEFAULT_PORT)?,
            jwt_secret,
            session_ttl: chrono::Duration::hours(number(&get, "JWT_EXPIRY_HOURS", 168)?),
            verification_ttl: chrono::Duration::minutes(number(&get, "VERIFICATION_TTL_MINUTES", 60)?),
            mailer,
        })
    }

    pub fn allowed_origins(&self) -> AllowedOrigins {
        AllowedOrigins::new(self.frontend_url.as_deref())
    }

    /// Link mailed on sign-up; points at the frontend's verification page.
    pub fn verification_link(&self, token: &str) -> String {
        let base = self.frontend_url.as_deref().unwrap_or(DEV_ORIGINS[0]);
        format!("{}/verify-email?token={}", base.trim_end_matches('/'), token)
    }
}

fn retry_policy(get: &impl Fn(&str) -> Option<String>) -> Result<RetryPolicy, ConfigError> {
    let defaults = RetryPolicy::default();

    let strategy = match get("EMAIL_RETRY_STRATEGY") {
        None => defaults.strategy,
        Some(value) => value
            .parse::<BackoffStrategy>()
            .map_err(|reason| ConfigError::InvalidValue {
                key: "EMAIL_RETRY_STRATEGY",
                reason,
            })?,
    };

    let base_ms = number(get, "EMAIL_RETRY_BASE_MS", defaults.base_delay.as_millis() as u64)?;
    let max_ms = number(get, "EMAIL_RETRY_MAX_MS", defaults.max_delay.as_millis() as u64)?;
    if max_ms < base_ms {
        return Err(ConfigError::InvalidValue {
            key: "EMAIL_RETRY_MAX_MS",
            reason: format!("must be at least EMAIL_RETRY_BASE_MS ({base_ms})"),
        });
    }

    Ok(RetryPolicy {
        max_attempts: number(get, "EMAIL_MAX_ATTEMPTS", defaults.max_attempts)?,
        base_delay: Duration::from_millis(base_ms),
        max_delay: Duration::from_millis(max_ms),
        strategy,
    })
}

fn number<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}
