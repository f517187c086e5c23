use std::{env, fmt::Display, str::FromStr};
use dotenv::dotenv;
use log::{info, warn};

/// Which store and session backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Postgres for rows, Redis for sessions
    Postgres,
    /// Everything in process, lost on restart
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Backend::Postgres),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Environment variable '{}' not set", key),
            ConfigError::Invalid(key, reason) => write!(f, "Invalid value for '{}': {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub bind_addr: String,
    /// Lifetime of a session token, refreshed on demand
    pub session_ttl_secs: u64,
    /// Number of posts shown on the home list
    pub list_limit: i64,
}

impl Config {
    /// Reads the configuration from the environment, loading `.env` first if present.
    /// `DATABASE_URL` and `REDIS_URL` are only required for the postgres backend.
    pub fn from_env() -> Result<Config, ConfigError> {
        dotenv().ok();

        let backend: Backend = try_load("BLOG_BACKEND", "postgres")?;
        let database_url = env::var("DATABASE_URL").ok();
        let redis_url = env::var("REDIS_URL").ok();

        if backend == Backend::Postgres {
            if database_url.is_none() {
                return Err(ConfigError::Missing("DATABASE_URL"));
            }
            if redis_url.is_none() {
                return Err(ConfigError::Missing("REDIS_URL"));
            }
        }

        Ok(Config {
            backend,
            database_url,
            redis_url,
            bind_addr: try_load("BIND_ADDR", "127.0.0.1:8080")?,
            session_ttl_secs: try_load("SESSION_TTL_SECS", "3600")?,
            list_limit: check_list_limit(try_load("BLOG_LIST_LIMIT", "20")?)?,
        })
    }

    /// Configuration for a self-contained in-memory run
    pub fn memory() -> Config {
        Config {
            backend: Backend::Memory,
            database_url: None,
            redis_url: None,
            bind_addr: "127.0.0.1:8080".to_string(),
            session_ttl_secs: 3600,
            list_limit: 20,
        }
    }
}

/// The home list shows at least one blog
fn check_list_limit(limit: i64) -> Result<i64, ConfigError> {
    if limit < 1 {
        warn!("Invalid BLOG_LIST_LIMIT value: {}", limit);
        return Err(ConfigError::Invalid("BLOG_LIST_LIMIT", "must be at least 1".to_string()));
    }
    Ok(limit)
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {} value: {}", key, e);
        ConfigError::Invalid(key, e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parsing() {
        pretty_assertions::assert_eq!("postgres".parse::<Backend>(), Ok(Backend::Postgres));
        pretty_assertions::assert_eq!("MEMORY".parse::<Backend>(), Ok(Backend::Memory));
        assert!("sqlite".parse::<Backend>().is_err());
    }

    #[test]
    fn test_list_limit_must_be_positive() {
        pretty_assertions::assert_eq!(check_list_limit(20).unwrap(), 20);
        pretty_assertions::assert_eq!(check_list_limit(1).unwrap(), 1);
        for limit in [0, -5] {
            let err = check_list_limit(limit).unwrap_err();
            pretty_assertions::assert_eq!(err.to_string(), "Invalid value for 'BLOG_LIST_LIMIT': must be at least 1");
        }
    }

    #[test]
    fn test_memory_defaults() {
        let config = Config::memory();
        pretty_assertions::assert_eq!(config.list_limit, 20);
        pretty_assertions::assert_eq!(config.backend, Backend::Memory);
    }
}
