//! Rate limiting for credential endpoints using governor and `tower_governor`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Forwarding headers consulted for the client IP, in order.
const CLIENT_IP_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "fly-client-ip"];

/// Key extractor for the client IP.
///
/// Forwarding headers are only believed when the socket peer is one of the
/// trusted proxies (the dashboard); anyone else is keyed on their own
/// address. Requests with no peer at all (in-process tests) share the
/// unspecified address bucket.
#[derive(Clone)]
pub struct ClientIpKeyExtractor {
    trusted_proxies: Arc<[IpAddr]>,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub fn new(trusted_proxies: &[IpAddr]) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }

    fn resolve(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> IpAddr {
        let Some(peer) = peer else {
            return IpAddr::V4(Ipv4Addr::UNSPECIFIED);
        };
        if !self.trusted_proxies.contains(&peer) {
            return peer;
        }
        forwarded_client(headers).unwrap_or(peer)
    }
}

/// First parseable client address in the forwarding headers.
fn forwarded_client(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        // X-Forwarded-For carries a chain; the first hop is the client
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(self.resolve(req.headers(), peer))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Rate limiter for sign-in and sign-up: ~10 requests per minute per client.
///
/// Replenishes one request every 6 seconds with a burst of 5.
///
/// # Panics
///
/// Never panics: `per_second(6)` and `burst_size(5)` are valid positive
/// values for `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trusted_proxies: &[IpAddr]) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trusted_proxies))
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tower_governor::key_extractor::KeyExtractor;

    const DASHBOARD: [u8; 4] = [10, 0, 0, 7];

    fn extractor() -> ClientIpKeyExtractor {
        ClientIpKeyExtractor::new(&[IpAddr::from(DASHBOARD)])
    }

    fn request(peer: [u8; 4], forwarded: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/session");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 4000))));
        req
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_trusted_proxy_forwarded_for_first_hop() {
        let req = request(DASHBOARD, Some("203.0.113.7, 10.0.0.1"));
        assert_eq!(extractor().extract(&req).unwrap(), ip("203.0.113.7"));
    }

    #[test]
    fn test_trusted_proxy_without_header_keys_on_peer() {
        let req = request(DASHBOARD, None);
        assert_eq!(extractor().extract(&req).unwrap(), ip("10.0.0.7"));
    }

    #[test]
    fn test_untrusted_peer_cannot_choose_its_key() {
        let req = request([192, 0, 2, 1], Some("203.0.113.7"));
        assert_eq!(extractor().extract(&req).unwrap(), ip("192.0.2.1"));
    }

    #[test]
    fn test_no_address_shares_unspecified_bucket() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(())
            .unwrap();
        assert_eq!(
            extractor().extract(&req).unwrap(),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }
}
