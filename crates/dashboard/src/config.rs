//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DASHBOARD_API_URL` - Base URL of the REST backend (e.g. `http://127.0.0.1:3333`)
//!
//! ## Optional
//! - `DASHBOARD_HOST` - Bind address (default: 127.0.0.1)
//! - `DASHBOARD_PORT` - Listen port (default: 3000)
//! - `DASHBOARD_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `DASHBOARD_COOKIE_SECURE` - Mark the session cookie `Secure`
//!   (default: true iff `DASHBOARD_BASE_URL` is https)
//! - `DASHBOARD_TRUSTED_PROXIES` - Comma-separated peers (a load balancer in
//!   front of the dashboard) whose `X-Forwarded-For` names the browser
//!   (default: none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Dashboard application configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// REST backend base URL
    pub api_url: Url,
    /// Public URL of the dashboard
    pub base_url: String,
    /// Whether the session cookie is `Secure`
    pub cookie_secure: bool,
    /// Peers allowed to name the browser in forwarding headers
    pub trusted_proxies: Vec<IpAddr>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl DashboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("DASHBOARD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DASHBOARD_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_PORT".to_string(), e.to_string()))?;

        let api_url = parse_api_url(&get_required_env("DASHBOARD_API_URL")?)?;
        let base_url = get_env_or_default("DASHBOARD_BASE_URL", "http://localhost:3000");
        let cookie_secure = match get_optional_env("DASHBOARD_COOKIE_SECURE") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "DASHBOARD_COOKIE_SECURE".to_string(),
                    format!("expected true/false, got '{value}'"),
                )
            })?,
            None => base_url.starts_with("https://"),
        };
        let trusted_proxies = parse_ip_list(&get_env_or_default("DASHBOARD_TRUSTED_PROXIES", ""))
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_TRUSTED_PROXIES".to_string(), e))?;

        Ok(Self {
            host,
            port,
            api_url,
            base_url,
            cookie_secure,
            trusted_proxies,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// The backend must be reached over http(s).
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "DASHBOARD_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_ip_list(value: &str) -> Result<Vec<IpAddr>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<IpAddr>().map_err(|e| format!("{s}: {e}")))
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_trusted_proxies_list() {
        assert!(parse_ip_list("").unwrap().is_empty());
        assert_eq!(
            parse_ip_list("10.0.0.2 , fd00::1").unwrap(),
            vec![
                "10.0.0.2".parse::<IpAddr>().unwrap(),
                "fd00::1".parse::<IpAddr>().unwrap()
            ]
        );
        assert!(parse_ip_list("lb.internal").is_err());
    }

    #[test]
    fn test_parse_api_url() {
        assert_eq!(
            parse_api_url("http://127.0.0.1:3333").unwrap().port(),
            Some(3333)
        );
        assert!(parse_api_url("ftp://files.example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = DashboardConfig {
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            api_url: Url::parse("http://127.0.0.1:3333").unwrap(),
            base_url: "http://localhost:3000".into(),
            cookie_secure: false,
            trusted_proxies: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        assert_eq!(config.socket_addr().port(), 3000);
    }
}
