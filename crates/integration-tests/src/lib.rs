//! Integration tests for Storekeep.
//!
//! The harness runs the real dashboard on an ephemeral port, wired to an
//! in-process fake of the REST backend, and drives it over HTTP with
//! `reqwest`.
//!
//! # Running Tests
//!
//! ```bash
//! # Self-contained tests
//! cargo test -p storekeep-integration-tests
//!
//! # Also run the tests against a live API + database
//! STOREKEEP_DASHBOARD_URL=http://localhost:3000 \
//!     cargo test -p storekeep-integration-tests -- --ignored
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use tokio::net::TcpListener;
use url::Url;

use storekeep_core::{
    CategoryId, CategorySummary, Email, ErrorBody, Price, ProductId, ProductListing, SessionGrant,
    SessionRequest, UserId, UserProfile,
};
use storekeep_dashboard::config::DashboardConfig;
use storekeep_dashboard::routes;
use storekeep_dashboard::state::AppState;

/// Account the fake backend accepts.
pub const EMAIL: &str = "alice@example.com";
/// Password for [`EMAIL`].
pub const PASSWORD: &str = "calabresa";
/// Token the fake backend issues and accepts.
pub const GOOD_TOKEN: &str = "tok-good";
/// Identifier of the single category the fake backend knows.
pub const PIZZAS: &str = "cat-pizzas";

/// Call counters, so tests can assert the backend was (or wasn't) reached.
#[derive(Debug, Default)]
pub struct BackendCalls {
    pub session: AtomicUsize,
    pub me: AtomicUsize,
    pub categories: AtomicUsize,
    /// `X-Forwarded-For` of each `POST /session`.
    pub forwarded_for: Mutex<Vec<Option<String>>>,
}

impl BackendCalls {
    #[must_use]
    pub fn me(&self) -> usize {
        self.me.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn session(&self) -> usize {
        self.session.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn forwarded_for(&self) -> Vec<Option<String>> {
        self.forwarded_for
            .lock()
            .expect("forwarded_for lock poisoned")
            .clone()
    }
}

type Rejection = (StatusCode, Json<ErrorBody>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

fn authorize(headers: &HeaderMap) -> Result<(), Rejection> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match bearer {
        Some(GOOD_TOKEN) => Ok(()),
        Some(_) => Err(reject(StatusCode::UNAUTHORIZED, "Invalid token")),
        None => Err(reject(StatusCode::UNAUTHORIZED, "Missing token")),
    }
}

fn alice() -> UserId {
    UserId::new("user-alice")
}

fn email() -> Email {
    Email::parse(EMAIL).expect("valid fixture email")
}

async fn session(
    State(calls): State<Arc<BackendCalls>>,
    headers: HeaderMap,
    Json(req): Json<SessionRequest>,
) -> Result<Json<SessionGrant>, Rejection> {
    calls.session.fetch_add(1, Ordering::SeqCst);
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    calls
        .forwarded_for
        .lock()
        .expect("forwarded_for lock poisoned")
        .push(forwarded);
    if req.email != EMAIL || req.password != PASSWORD {
        return Err(reject(StatusCode::UNAUTHORIZED, "Email/password incorrect"));
    }
    Ok(Json(SessionGrant {
        id: alice(),
        name: "Alice".to_string(),
        email: email(),
        token: GOOD_TOKEN.to_string(),
    }))
}

async fn me(
    State(calls): State<Arc<BackendCalls>>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, Rejection> {
    calls.me.fetch_add(1, Ordering::SeqCst);
    authorize(&headers)?;
    Ok(Json(UserProfile {
        id: alice(),
        name: "Alice".to_string(),
        email: email(),
    }))
}

async fn categories(
    State(calls): State<Arc<BackendCalls>>,
    headers: HeaderMap,
) -> Result<Json<Vec<CategorySummary>>, Rejection> {
    calls.categories.fetch_add(1, Ordering::SeqCst);
    authorize(&headers)?;
    Ok(Json(vec![CategorySummary {
        id: CategoryId::new(PIZZAS),
        name: "Pizzas".to_string(),
    }]))
}

#[derive(Deserialize)]
struct ByCategory {
    #[serde(default)]
    category_id: String,
}

async fn products(
    headers: HeaderMap,
    Query(query): Query<ByCategory>,
) -> Result<Json<Vec<ProductListing>>, Rejection> {
    authorize(&headers)?;
    if query.category_id != PIZZAS {
        return Ok(Json(Vec::new()));
    }
    Ok(Json(vec![ProductListing {
        id: ProductId::new("prod-margherita"),
        name: "Margherita".to_string(),
        description: "Tomato, mozzarella, basil".to_string(),
        price: Price::parse("42.50").expect("valid fixture price"),
        banner: "margherita.png".to_string(),
        category_id: CategoryId::new(PIZZAS),
    }]))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .ok();
    });
    addr
}

/// Running dashboard plus the fake backend behind it.
pub struct TestContext {
    pub client: Client,
    pub dashboard_url: String,
    pub calls: Arc<BackendCalls>,
}

impl TestContext {
    /// Start the fake backend and a dashboard pointed at it.
    pub async fn start() -> Self {
        let calls = Arc::new(BackendCalls::default());
        let backend = Router::new()
            .route("/session", post(session))
            .route("/me", get(me))
            .route("/category", get(categories))
            .route("/category/product", get(products))
            .with_state(Arc::clone(&calls));
        let backend_addr = serve(backend).await;

        let config = DashboardConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            api_url: Url::parse(&format!("http://{backend_addr}")).expect("valid backend url"),
            base_url: "http://localhost".to_string(),
            cookie_secure: false,
            trusted_proxies: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::new(config).expect("Failed to build dashboard state");
        let dashboard_addr = serve(routes::app(state)).await;

        Self {
            client: no_redirect_client(),
            dashboard_url: format!("http://{dashboard_addr}"),
            calls,
        }
    }

    /// Absolute dashboard URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.dashboard_url)
    }
}

/// HTTP client that reports redirects instead of following them.
#[must_use]
pub fn no_redirect_client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The session cookie's `name=value` pair from a response, if it set one.
#[must_use]
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("@nextauth.token="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

/// The redirect target of a response.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
