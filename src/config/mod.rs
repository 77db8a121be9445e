use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// 计数器持久化后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterBackend {
    Memory,
    Redis,
    Postgres,
}

impl FromStr for CounterBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(CounterBackend::Memory),
            "redis" => Ok(CounterBackend::Redis),
            "postgres" | "postgresql" => Ok(CounterBackend::Postgres),
            other => Err(ConfigError::InvalidBackend(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown counter backend `{0}` (expected memory, redis or postgres)")]
    InvalidBackend(String),
    #[error("{0} must be set when COUNTER_BACKEND={1}")]
    MissingUrl(&'static str, &'static str),
    #[error("RATE_LIMIT_REQUESTS must be greater than zero")]
    ZeroCeiling,
    #[error("CACHE_MAX_ENTRIES must be greater than zero")]
    ZeroCapacity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub cache_max_entries: usize,
    pub cache_ttl_secs: u64,
    pub rate_limit_requests: u64,
    pub counter_backend: CounterBackend,
    pub redis_url: Option<String>,
    pub database_url: Option<String>,
    pub scrape_url: String,
    pub scrape_interval_secs: u64,
    pub scrape_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            cache_max_entries: 100,
            cache_ttl_secs: 300,
            rate_limit_requests: 5,
            counter_backend: CounterBackend::Memory,
            redis_url: None,
            database_url: None,
            scrape_url: "https://indianexpress.com/".to_string(),
            scrape_interval_secs: 3600,
            scrape_enabled: true,
        }
    }
}

// 读取环境变量，缺失或解析失败时使用默认值
fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let counter_backend = match env::var("COUNTER_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.counter_backend,
        };

        let config = Config {
            server_host: var_or("SERVER_HOST", defaults.server_host),
            server_port: var_or("SERVER_PORT", defaults.server_port),
            cache_max_entries: var_or("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cache_ttl_secs: var_or("CACHE_TTL", defaults.cache_ttl_secs),
            rate_limit_requests: var_or("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            counter_backend,
            redis_url: env::var("REDIS_URL").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            scrape_url: var_or("SCRAPE_URL", defaults.scrape_url),
            scrape_interval_secs: var_or("SCRAPE_INTERVAL", defaults.scrape_interval_secs),
            scrape_enabled: var_or("SCRAPE_ENABLED", defaults.scrape_enabled),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_requests == 0 {
            return Err(ConfigError::ZeroCeiling);
        }
        if self.cache_max_entries == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        match self.counter_backend {
            CounterBackend::Redis if self.redis_url.is_none() => {
                Err(ConfigError::MissingUrl("REDIS_URL", "redis"))
            }
            CounterBackend::Postgres if self.database_url.is_none() => {
                Err(ConfigError::MissingUrl("DATABASE_URL", "postgres"))
            }
            _ => Ok(()),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.scrape_interval_secs)
    }
}
