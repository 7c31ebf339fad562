//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health          - Liveness check
//!
//! # Guests only (signed-in users go to /dashboard)
//! GET  /                - Sign-in page
//! POST /                - Sign in (rate limited per browser)
//! GET  /signup          - Sign-up page
//! POST /signup          - Create an account (rate limited per browser)
//!
//! # Signed in (no cookie: redirect to /)
//! POST /logout          - Sign out
//! GET  /dashboard       - Overview
//! GET  /product         - New product form
//! POST /product         - Register a product (multipart)
//! GET  /category        - Categories, ?category_id= shows its products
//! POST /category        - Create a category
//! ```

pub mod auth;
pub mod category;
pub mod dashboard;
pub mod product;

use std::net::IpAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::{credential_rate_limiter, security_headers_middleware};
use crate::state::AppState;

/// Page paths referenced by redirects.
pub mod paths {
    pub const SIGN_IN: &str = "/";
    pub const SIGN_UP: &str = "/signup";
    pub const LOGOUT: &str = "/logout";
    pub const DASHBOARD: &str = "/dashboard";
    pub const PRODUCT: &str = "/product";
    pub const CATEGORY: &str = "/category";
}

/// Largest accepted product form (banner included).
const MAX_PRODUCT_FORM_BYTES: usize = 10 * 1024 * 1024;

/// Build the dashboard router with all routes.
///
/// `trusted_proxies` are the peers whose forwarding headers name the browser
/// for the credential rate limiter.
pub fn routes(trusted_proxies: &[IpAddr]) -> Router<AppState> {
    let credentials = Router::new()
        .route(paths::SIGN_IN, post(auth::sign_in))
        .route(paths::SIGN_UP, post(auth::sign_up))
        .layer(credential_rate_limiter(trusted_proxies));

    Router::new()
        .route("/health", get(health))
        .route(paths::SIGN_IN, get(auth::sign_in_page))
        .route(paths::SIGN_UP, get(auth::sign_up_page))
        .merge(credentials)
        .route(paths::LOGOUT, post(auth::logout))
        .route(paths::DASHBOARD, get(dashboard::show))
        .route(
            paths::PRODUCT,
            get(product::new_product)
                .post(product::create)
                .layer(DefaultBodyLimit::max(MAX_PRODUCT_FORM_BYTES)),
        )
        .route(paths::CATEGORY, get(category::index).post(category::create))
}

/// Build the complete application: routes, static assets, and the
/// tracing/security layers.
pub fn app(state: AppState) -> Router {
    let assets = ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"));

    routes(&state.config().trusted_proxies)
        .nest_service("/static", assets)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Fresh form nonce keying in-flight submissions.
pub(crate) fn new_nonce() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
