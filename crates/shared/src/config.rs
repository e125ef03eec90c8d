use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::config_env::{optional_trimmed_env, parse_u16_env, parse_u32_env, require_env};
use crate::llm::OpenAiGatewayConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_POSTGRES_PORT: u16 = 5432;
const DEFAULT_HISTORY_LIMIT: u32 = 50;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub history_default_limit: u32,
    pub completion: OpenAiGatewayConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build completion http client: {0}")]
    HttpClient(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            history_default_limit: parse_u32_env("HISTORY_DEFAULT_LIMIT", DEFAULT_HISTORY_LIMIT)?,
            completion: OpenAiGatewayConfig::from_env()?,
            store: StoreConfig::from_env()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Sqlite,
}

impl StoreBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::InvalidConfiguration(format!(
                "DB_BACKEND must be postgres or sqlite, got '{other}'"
            ))),
        }
    }
}

/// Where chat turns are written. Each variant maps to one history adapter.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    Postgres(PostgresStoreConfig),
    Sqlite(SqliteStoreConfig),
}

#[derive(Debug, Clone)]
pub struct PostgresStoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match optional_trimmed_env("DB_BACKEND") {
            Some(raw) => raw.parse::<StoreBackend>()?,
            None => StoreBackend::Postgres,
        };

        match backend {
            StoreBackend::Postgres => Ok(Self::Postgres(PostgresStoreConfig {
                host: require_env("DB_SERVER")?,
                port: parse_u16_env("DB_PORT", DEFAULT_POSTGRES_PORT)?,
                database: require_env("DB_NAME")?,
                user: require_env("DB_USER")?,
                password: require_env("DB_PASSWORD")?,
            })),
            StoreBackend::Sqlite => Ok(Self::Sqlite(SqliteStoreConfig {
                path: PathBuf::from(require_env("DB_NAME")?),
            })),
        }
    }

    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Postgres(_) => StoreBackend::Postgres,
            Self::Sqlite(_) => StoreBackend::Sqlite,
        }
    }
}
