//! Per-browser rate limiting of the sign-in and sign-up forms.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use super::client_ip::{resolve_client_ip, socket_peer};

/// Keys the limiter on the browser address from [`resolve_client_ip`].
/// Requests without a socket address share one bucket.
#[derive(Clone)]
pub struct BrowserKeyExtractor {
    trusted_proxies: Arc<[IpAddr]>,
}

impl BrowserKeyExtractor {
    #[must_use]
    pub fn new(trusted_proxies: &[IpAddr]) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

impl tower_governor::key_extractor::KeyExtractor for BrowserKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let ip = resolve_client_ip(
            req.headers(),
            socket_peer(req.extensions()),
            &self.trusted_proxies,
        );
        Ok(ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)))
    }
}

pub type RateLimiterLayer =
    GovernorLayer<BrowserKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// One credential submission every 6 seconds per browser, burst of 5.
///
/// # Panics
///
/// Never panics: `per_second(6)` and `burst_size(5)` are valid positive
/// values for `GovernorConfigBuilder`.
#[must_use]
pub fn credential_rate_limiter(trusted_proxies: &[IpAddr]) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(BrowserKeyExtractor::new(trusted_proxies))
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}
