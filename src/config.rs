use std::env;
use std::path::PathBuf;

use crate::policy::CreatePolicy;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

/// Process configuration, read from the environment (plus `.env` in debug
/// builds, loaded by `main`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Postgres backend when set, in-memory otherwise.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    /// Snapshot directory for the in-memory backend.
    pub data_dir: Option<PathBuf>,
    pub frontend_url: Option<String>,
    pub create_policy: CreatePolicy,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(var) {
        None => Ok(default),
        Some(value) => match value.parse::<T>() {
            Ok(v) => Ok(v),
            Err(e) => Err(ConfigError::Invalid { var, reason: e.to_string(), value }),
        },
    }
}

fn flag(var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match non_empty(var) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { var, value: v, reason: "expected a boolean".into() }),
        },
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 8080)?,
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
            run_migrations: flag("RUN_MIGRATIONS", true)?,
            data_dir: non_empty("BOARD_DATA_DIR").map(PathBuf::from),
            frontend_url: non_empty("FRONTEND_URL"),
            create_policy: parsed("BOARD_CREATE_POLICY", CreatePolicy::Deny)?,
        })
    }
}
