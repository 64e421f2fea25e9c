use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub cors: CorsConfig,
    /// Origin used to build `short_url`. Derived from the request `Host` when unset.
    pub public_base_url: Option<String>,
    pub code_generation_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    /// `None` selects the non-durable in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Memory,
    Sqlite,
    Postgres,
}

impl DatabaseBackend {
    /// Guess the backend from a connection string's scheme.
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseBackend::Postgres
        } else {
            DatabaseBackend::Sqlite
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origin: String,
}

impl Config {
    const DEFAULT_CODE_GENERATION_ATTEMPTS: usize = 20;

    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let backend = match std::env::var("DATABASE_BACKEND") {
            Ok(value) => match value.to_lowercase().as_str() {
                "postgres" | "postgresql" => DatabaseBackend::Postgres,
                "sqlite" => DatabaseBackend::Sqlite,
                "memory" => DatabaseBackend::Memory,
                other => {
                    tracing::warn!(
                        "Unknown DATABASE_BACKEND '{other}', inferring from DATABASE_URL. Supported values: sqlite, postgres, memory"
                    );
                    infer_backend(database_url.as_deref())
                }
            },
            Err(_) => infer_backend(database_url.as_deref()),
        };

        let max_connections = env_parse("DATABASE_MAX_CONNECTIONS", 10u32)?;
        let acquire_timeout_secs = env_parse("DATABASE_ACQUIRE_TIMEOUT_SECS", 5u64)?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env_parse("PORT", 3001u16)?;

        let allowed_origin = std::env::var("CORS_ALLOWED_ORIGIN")
            .or_else(|_| std::env::var("BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let code_generation_attempts =
            env_parse("CODE_GENERATION_ATTEMPTS", Self::DEFAULT_CODE_GENERATION_ATTEMPTS)?.max(1);

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
                acquire_timeout_secs,
            },
            server: ServerConfig { host, port },
            cors: CorsConfig { allowed_origin },
            public_base_url,
            code_generation_attempts,
        })
    }
}

fn infer_backend(url: Option<&str>) -> DatabaseBackend {
    url.map(DatabaseBackend::from_url)
        .unwrap_or(DatabaseBackend::Memory)
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
