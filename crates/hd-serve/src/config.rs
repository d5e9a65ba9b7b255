use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = ".helpdesk/helpdesk.db";
pub const DEFAULT_PORT: u16 = 4830;
pub const DEFAULT_LOG: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {message}")]
    Invalid {
        key: &'static str,
        value: String,
        message: String,
    },
    #[error("{key} must be set")]
    Missing { key: &'static str },
    #[error("cannot create database directory {path}: {message}")]
    DbDir { path: String, message: String },
}

/// Settings read once at startup from `HELPDESK_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub bind: IpAddr,
    pub jwt_secret: Option<String>,
    pub expose_errors: bool,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Ok(Self {
            db_path: var("HELPDESK_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            port: parse_or("HELPDESK_PORT", var("HELPDESK_PORT"), DEFAULT_PORT)?,
            bind: parse_or(
                "HELPDESK_BIND",
                var("HELPDESK_BIND"),
                IpAddr::V4(Ipv4Addr::LOCALHOST),
            )?,
            jwt_secret: var("HELPDESK_JWT_SECRET"),
            expose_errors: parse_flag("HELPDESK_EXPOSE_ERRORS", var("HELPDESK_EXPOSE_ERRORS"))?,
            log_filter: var("HELPDESK_LOG").unwrap_or_else(|| DEFAULT_LOG.to_string()),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn require_jwt_secret(&self) -> Result<&str, ConfigError> {
        self.jwt_secret.as_deref().ok_or(ConfigError::Missing {
            key: "HELPDESK_JWT_SECRET",
        })
    }

    /// Creates the parent directory of the database file.
    pub fn prepare_db_dir(&self) -> Result<(), ConfigError> {
        let Some(parent) = Path::new(&self.db_path).parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(parent).map_err(|err| ConfigError::DbDir {
            path: parent.display().to_string(),
            message: err.to_string(),
        })
    }
}

fn parse_or<T>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(value) => value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            message: err.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            message: "expected a boolean".to_string(),
        }),
    }
}
