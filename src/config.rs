use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_admin_per_min: u32,

    // Public holiday cache
    pub holiday_cache_ttl_secs: u64,
    pub holiday_cache_capacity: u64,

    pub db_max_connections: u32,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_protected_per_min: or_default("RATE_PROTECTED_PER_MIN", 1000)?,
            rate_admin_per_min: or_default("RATE_ADMIN_PER_MIN", 120)?,

            holiday_cache_ttl_secs: or_default("HOLIDAY_CACHE_TTL_SECS", 3600)?, // 1 hour
            holiday_cache_capacity: or_default("HOLIDAY_CACHE_CAPACITY", 10_000)?,

            db_max_connections: or_default("DB_MAX_CONNECTIONS", 10)?,
        })
    }
}
