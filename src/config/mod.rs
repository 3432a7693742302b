use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use axum::http::{HeaderValue, Uri};

pub mod cors;

pub use cors::create_cors_layer;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_RUST_LOG: &str = "calendar_server=debug,tower_http=debug";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone)]
pub struct Config {
    /// Without a database URL events live in memory for the life of the process.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub rust_log: String,
    /// Exact `Origin` values browsers may call from. Empty means any origin.
    pub cors_allowed_origins: Vec<HeaderValue>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            host: parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_RUST_LOG.to_string()),
            cors_allowed_origins: origins(
                lookup("CORS_ALLOWED_ORIGINS")
                    .as_deref()
                    .unwrap_or(DEFAULT_ALLOWED_ORIGINS),
            ),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Config: invalid {}='{}', using default", key, raw);
            default
        }),
    }
}

/// Comma separated `scheme://host[:port]` entries. Anything a browser would
/// never send as an `Origin` header is dropped with a warning.
fn origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match origin(entry) {
            Some(value) => Some(value),
            None => {
                tracing::warn!("Config: ignoring CORS origin '{}'", entry);
                None
            }
        })
        .collect()
}

fn origin(entry: &str) -> Option<HeaderValue> {
    let uri: Uri = entry.parse().ok()?;
    let canonical = format!("{}://{}", uri.scheme()?, uri.authority()?);
    // a path or trailing slash never matches the header
    (canonical == entry)
        .then(|| HeaderValue::from_str(entry).ok())
        .flatten()
}
