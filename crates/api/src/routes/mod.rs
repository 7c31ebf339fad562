//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                    - Liveness check
//! GET  /health/ready              - Readiness check (database)
//!
//! # Accounts (rate limited)
//! POST /users                     - Register a staff account
//! POST /session                   - Sign in, returns a bearer token
//!
//! # Authenticated (Authorization: Bearer <token>)
//! GET  /me                        - Current user profile
//! POST /category                  - Create a category
//! GET  /category                  - List categories
//! GET  /category/product          - Products of ?category_id=
//! POST /product                   - Create a product (multipart)
//!
//! # Static
//! GET  /files/{name}              - Uploaded banners
//! ```

pub mod category;
pub mod health;
pub mod me;
pub mod product;
pub mod session;
pub mod users;

use std::net::IpAddr;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::{auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Largest accepted product upload (banner included).
const MAX_PRODUCT_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the API router with all routes.
///
/// `trusted_proxies` are the peers whose forwarding headers key the
/// credential rate limiter.
pub fn routes(trusted_proxies: &[IpAddr]) -> Router<AppState> {
    let accounts = Router::new()
        .route("/users", post(users::create))
        .route("/session", post(session::create))
        .layer(auth_rate_limiter(trusted_proxies));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(accounts)
        .route("/me", get(me::show))
        .route("/category", get(category::index).post(category::create))
        .route("/category/product", get(category::products))
        .route(
            "/product",
            post(product::create).layer(DefaultBodyLimit::max(MAX_PRODUCT_UPLOAD_BYTES)),
        )
}

/// Build the complete application: routes, static banners, and the
/// tracing/request-ID layers.
pub fn app(state: AppState) -> Router {
    let files = ServeDir::new(state.uploads().dir());

    routes(&state.config().trusted_proxies)
        .nest_service("/files", files)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use storekeep_core::{ErrorBody, UserId};

    use crate::config::ApiConfig;

    const SECRET: &str = "q8R#v2Lm!Zt7@Wc4$Kp9^Hy3&Nd6*Bf1";

    fn state() -> AppState {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/storekeep_test"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            token_secret: SecretString::from(SECRET),
            upload_dir: std::env::temp_dir().join("storekeep-test-uploads"),
            trusted_proxies: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            sentry_dsn: None,
            sentry_environment: None,
        };
        // Never connects: these tests only reach handlers that reject first
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/storekeep_test")
            .unwrap();
        AppState::new(config, pool).unwrap()
    }

    async fn error_body(response: axum::response::Response) -> ErrorBody {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_me_without_token_is_401() {
        let response = app(state())
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(response).await.error, "Missing token");
    }

    #[tokio::test]
    async fn test_me_with_forged_token_is_401() {
        let response = app(state())
            .oneshot(
                Request::get("/me")
                    .header(header::AUTHORIZATION, "Bearer e30.deadbeef")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_body(response).await.error, "Invalid token");
    }

    #[tokio::test]
    async fn test_category_listing_requires_token() {
        let response = app(state())
            .oneshot(
                Request::get("/category/product?category_id=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_category_rejects_blank_name() {
        let state = state();
        let token = state.tokens().issue(&UserId::new("u1"));

        let response = app(state)
            .oneshot(
                Request::post("/category")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"name":"   "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await.error, "Category name is required");
    }

    async fn post_session(app: &Router, peer: [u8; 4], forwarded_for: &str) -> StatusCode {
        let mut request = Request::post("/session")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::from("{}"))
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((peer, 5000))));
        app.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_dashboard_sign_ins_are_limited_per_browser() {
        let app = app(state());

        for n in 1..=7 {
            let status = post_session(&app, [127, 0, 0, 1], &format!("203.0.113.{n}")).await;
            assert_ne!(status, StatusCode::TOO_MANY_REQUESTS, "browser {n} was throttled");
        }
    }

    #[tokio::test]
    async fn test_one_browser_is_throttled_after_burst() {
        let app = app(state());

        let mut statuses = Vec::new();
        for _ in 0..7 {
            statuses.push(post_session(&app, [127, 0, 0, 1], "203.0.113.9").await);
        }

        assert!(statuses[..5].iter().all(|s| *s != StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(statuses[6], StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_direct_caller_cannot_rotate_forwarded_for() {
        let app = app(state());

        let mut statuses = Vec::new();
        for n in 1..=7 {
            statuses.push(post_session(&app, [192, 0, 2, 50], &format!("198.51.100.{n}")).await);
        }

        assert_eq!(statuses[6], StatusCode::TOO_MANY_REQUESTS);
    }
}
