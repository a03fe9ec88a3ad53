use crate::application::ApplicationRepository;
use crate::error::ConfigError;
use crate::notification::{Notification, NotificationRepository};
use crate::reminder::ReminderService;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub notification_tx: broadcast::Sender<Notification>,
    pub application_repository: ApplicationRepository,
    pub notification_repository: NotificationRepository,
    pub reminder_service: ReminderService,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub scheduler: SchedulerConfig,
}

/// Settings for the reminder scheduling loop.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Six-field cron expression (seconds first).
    pub schedule: String,
    pub store_timeout: Duration,
    pub skip_overlapping_ticks: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule: "0 * * * * *".to_string(),
            store_timeout: Duration::from_secs(10),
            skip_overlapping_ticks: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so it can be
    /// exercised without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let defaults = SchedulerConfig::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: non_zero(
                "DATABASE_MAX_CONNECTIONS",
                parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            )?,
            jwt_secret: required("JWT_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            scheduler: SchedulerConfig {
                schedule: lookup("REMINDER_SCHEDULE").unwrap_or(defaults.schedule),
                store_timeout: Duration::from_secs(non_zero(
                    "REMINDER_STORE_TIMEOUT_SECS",
                    parse_or(&lookup, "REMINDER_STORE_TIMEOUT_SECS", defaults.store_timeout.as_secs())?,
                )?),
                skip_overlapping_ticks: parse_or(
                    &lookup,
                    "REMINDER_SKIP_OVERLAPPING",
                    defaults.skip_overlapping_ticks,
                )?,
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &redact_credentials(&self.database_url))
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"[redacted]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

/// Replaces the `user:password@` part of a connection URL.
fn redact_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://[redacted]{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

/// A zero pool size or store timeout would leave the reminder loop unable to
/// reach the database.
fn non_zero<T>(name: &'static str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
