use std::{env, str::FromStr, time::Duration};

use anyhow::Context;

/// Listen address shared by every service binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env(default_port: u16) -> Self {
        Self::from_lookup(default_port, |key| env::var(key).ok())
    }

    pub fn from_lookup(default_port: u16, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", default_port);
        Self { host, port }
    }
}

#[derive(Debug, Clone)]
pub struct OrderApiConfig {
    pub server: ServerConfig,
    pub database_url: String,
}

impl OrderApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env(3003),
            database_url: database_url(|key| env::var(key).ok(), "ORDER_DATABASE_URL")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CartApiConfig {
    pub server: ServerConfig,
    pub database_url: String,
}

impl CartApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env(3004),
            database_url: database_url(|key| env::var(key).ok(), "CART_DATABASE_URL")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PaymentRelayConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub order_api_url: String,
    pub order_api_timeout: Duration,
    /// `None` disables the background reconciliation sweep.
    pub reconcile_interval: Option<Duration>,
    pub reconcile_grace: Duration,
}

impl PaymentRelayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let order_api_url = lookup("ORDER_API_URL")
            .unwrap_or_else(|| "http://order-api:3003".to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout_ms: u64 = parse_or(&lookup, "ORDER_API_TIMEOUT_MS", 5_000);
        let interval_secs: u64 = parse_or(&lookup, "RECONCILE_INTERVAL_SECS", 60);
        let grace_secs: u64 = parse_or(&lookup, "RECONCILE_GRACE_SECS", 30);

        Ok(Self {
            server: ServerConfig::from_lookup(3006, &lookup),
            database_url: database_url(&lookup, "PAYMENT_DATABASE_URL")?,
            order_api_url,
            order_api_timeout: Duration::from_millis(timeout_ms.max(1)),
            reconcile_interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            reconcile_grace: Duration::from_secs(grace_secs),
        })
    }
}

fn database_url(lookup: impl Fn(&str) -> Option<String>, service_key: &str) -> anyhow::Result<String> {
    lookup(service_key)
        .or_else(|| lookup("DATABASE_URL"))
        .with_context(|| format!("{service_key} or DATABASE_URL must be set"))
}

fn parse_or<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}
