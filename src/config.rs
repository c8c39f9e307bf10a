use anyhow::{anyhow, Context, Result};
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` means the queue is unbounded.
    pub max_queue_size: Option<usize>,
    pub database_url: String,
    pub db_pool_size: u32,
    pub http_pool_size: usize,
    pub http_pool_count: usize,
    pub default_base_url: String,
    pub fallback_base_url: String,
    pub max_concurrency: usize,
    pub health_poll_interval: Duration,
    pub health_slow_threshold_ms: u64,
    pub request_timeout: Duration,
    /// Set in debug mode only: a hard budget for connection establishment.
    pub connect_budget: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let default_parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);

        let base_url = std::env::var("PAYMENTS_BASE_URL").ok();
        let default_base_url = std::env::var("PAYMENT_PROCESSOR_URL_DEFAULT")
            .ok()
            .or_else(|| base_url.clone())
            .unwrap_or_else(|| "http://localhost:8001".to_string());
        let fallback_base_url = std::env::var("PAYMENT_PROCESSOR_URL_FALLBACK")
            .ok()
            .or_else(|| base_url)
            .unwrap_or_else(|| "http://localhost:8002".to_string());

        Ok(Self {
            port: parse_env("PORT", 9999)?,
            max_queue_size: parse_queue_max()?,
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| database_url_from_parts()),
            db_pool_size: parse_env("DB_POOL_SIZE", 10)?,
            http_pool_size: parse_env("HTTP_POOL_SIZE", 32)?,
            http_pool_count: parse_env("HTTP_POOL_COUNT", 1)?,
            default_base_url,
            fallback_base_url,
            max_concurrency: parse_env("MAX_CONCURRENCY", 2 * default_parallelism)?,
            health_poll_interval: Duration::from_millis(parse_env("HEALTH_POLL_INTERVAL_MS", 5_000)?),
            health_slow_threshold_ms: parse_env("HEALTH_SLOW_THRESHOLD_MS", 30)?,
            request_timeout: Duration::from_millis(parse_env("REQUEST_TIMEOUT_MS", 1_000)?),
            connect_budget: truthy_env("DEBUG_CONNECT_BUDGET").then(|| Duration::from_millis(500)),
        })
    }
}

fn parse_queue_max() -> Result<Option<usize>> {
    match std::env::var("PAYMENT_QUEUE_MAX_SIZE") {
        Err(_) => Ok(Some(50_000)),
        Ok(raw) if raw.trim().eq_ignore_ascii_case("infinity") => Ok(None),
        Ok(raw) => {
            let max: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PAYMENT_QUEUE_MAX_SIZE={raw}"))?;
            if max == 0 {
                return Err(anyhow!("PAYMENT_QUEUE_MAX_SIZE must be positive"));
            }
            Ok(Some(max))
        }
    }
}

fn database_url_from_parts() -> String {
    let host = std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = std::env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let user = std::env::var("DB_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = std::env::var("DB_PASSWORD").unwrap_or_else(|_| "postgres".to_string());
    let name = std::env::var("DB_NAME").unwrap_or_else(|_| "payments".to_string());
    let ssl = if truthy_env("DB_SSL") { "?sslmode=require" } else { "" };

    format!("postgres://{user}:{password}@{host}:{port}/{name}{ssl}")
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {name}={raw}: {e}")),
    }
}

fn truthy_env(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "require"))
        .unwrap_or(false)
}
