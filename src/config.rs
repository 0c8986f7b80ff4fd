use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use http::HeaderValue;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
    pub cors_origins: Vec<HeaderValue>,
}

const DEFAULT_DATABASE_URL: &str = "sqlite://data/stocks.db?mode=rwc";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8080";

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env_or("HOST", "0.0.0.0");
        let port = env_or("PORT", "8080");
        let max_connections = env_or("DB_MAX_CONNECTIONS", "5");
        let origins = env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS);

        Ok(Self {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            host: host.parse().with_context(|| format!("Invalid HOST '{}'", host))?,
            port: port.parse().with_context(|| format!("Invalid PORT '{}'", port))?,
            max_connections: max_connections
                .parse()
                .with_context(|| format!("Invalid DB_MAX_CONNECTIONS '{}'", max_connections))?,
            cors_origins: parse_origins(&origins)?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_origins(raw: &str) -> anyhow::Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{}'", o)))
        .collect()
}
