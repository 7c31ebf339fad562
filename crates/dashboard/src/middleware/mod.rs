//! HTTP middleware stack for the dashboard.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers (CSP, frame and cache controls)
//! 4. Rate limiting on the sign-in and sign-up forms (governor)

pub mod client_ip;
pub mod rate_limit;
pub mod security_headers;

pub use client_ip::ClientIp;
pub use rate_limit::credential_rate_limiter;
pub use security_headers::security_headers_middleware;
