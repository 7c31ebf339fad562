//! The browser's address, as seen through any trusted proxy.
//!
//! The dashboard calls the backend on the browser's behalf, so the backend
//! only sees the dashboard's own address. Credential calls forward the
//! address resolved here in `X-Forwarded-For`.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};

use crate::state::AppState;

/// Forwarding headers consulted for the client IP, in order.
const CLIENT_IP_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "fly-client-ip"];

/// Resolve the browser address.
///
/// Forwarding headers count only when `peer` is a trusted proxy. `None` when
/// the request carries no socket address.
#[must_use]
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trusted_proxies: &[IpAddr],
) -> Option<IpAddr> {
    let peer = peer?;
    if !trusted_proxies.contains(&peer) {
        return Some(peer);
    }
    Some(forwarded_client(headers).unwrap_or(peer))
}

fn forwarded_client(headers: &HeaderMap) -> Option<IpAddr> {
    CLIENT_IP_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

/// Socket peer recorded by `into_make_service_with_connect_info`.
pub(crate) fn socket_peer(extensions: &axum::http::Extensions) -> Option<IpAddr> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Extractor for the resolved browser address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Infallible> {
        Ok(Self(resolve_client_ip(
            &parts.headers,
            socket_peer(&parts.extensions),
            &state.config().trusted_proxies,
        )))
    }
}
