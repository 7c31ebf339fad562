//! End-to-end session flows through the running dashboard.
//!
//! The self-contained tests need nothing running. The `#[ignore]`d test
//! needs the API (with a migrated database and a user created via
//! `storekeep user create`) and the dashboard pointed at it.

use reqwest::StatusCode;
use reqwest::header::COOKIE;

use storekeep_integration_tests::{
    EMAIL, GOOD_TOKEN, PASSWORD, PIZZAS, TestContext, location, no_redirect_client,
    session_cookie,
};

// ============================================================================
// Sign In
// ============================================================================

#[tokio::test]
async fn test_sign_in_sets_cookie_and_opens_dashboard() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .post(ctx.url("/"))
        .form(&[("email", EMAIL), ("password", PASSWORD), ("nonce", "n1")])
        .send()
        .await
        .expect("Failed to sign in");

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), Some("/dashboard?toast=logged_in"));
    let cookie = session_cookie(&resp).expect("session cookie set");
    assert_eq!(cookie, format!("@nextauth.token={GOOD_TOKEN}"));

    let page = ctx
        .client
        .get(ctx.url("/dashboard?toast=logged_in"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to load dashboard");

    assert_eq!(page.status(), StatusCode::OK);
    let body = page.text().await.expect("Failed to read response");
    assert!(body.contains("Welcome, Alice"));
    assert!(body.contains("Successfully logged in"));
}

#[tokio::test]
async fn test_wrong_password_shows_error_without_cookie() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .post(ctx.url("/"))
        .form(&[("email", EMAIL), ("password", "portuguesa"), ("nonce", "n1")])
        .send()
        .await
        .expect("Failed to post sign in");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Error accessing"));
    assert_eq!(ctx.calls.session(), 1);
}

#[tokio::test]
async fn test_sign_in_forwards_browser_address_to_backend() {
    let ctx = TestContext::start().await;

    ctx.client
        .post(ctx.url("/"))
        .header("x-forwarded-for", "203.0.113.50")
        .form(&[("email", EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .expect("Failed to sign in");

    // Not a trusted proxy: the dashboard forwards the socket peer, not the header
    assert_eq!(ctx.calls.forwarded_for(), vec![Some("127.0.0.1".to_string())]);
}

// ============================================================================
// Guards
// ============================================================================

#[tokio::test]
async fn test_protected_page_without_cookie_redirects_to_sign_in() {
    let ctx = TestContext::start().await;

    for path in ["/dashboard", "/product", "/category"] {
        let resp = ctx
            .client
            .get(ctx.url(path))
            .send()
            .await
            .expect("Failed to request page");

        assert!(resp.status().is_redirection(), "{path} should redirect");
        assert_eq!(location(&resp), Some("/"));
    }
    assert_eq!(ctx.calls.me(), 0);
}

#[tokio::test]
async fn test_sign_in_page_with_cookie_redirects_to_dashboard() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .get(ctx.url("/"))
        .header(COOKIE, format!("@nextauth.token={GOOD_TOKEN}"))
        .send()
        .await
        .expect("Failed to request sign in page");

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), Some("/dashboard"));
}

#[tokio::test]
async fn test_rejected_token_clears_cookie() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .get(ctx.url("/dashboard"))
        .header(COOKIE, "@nextauth.token=tok-revoked")
        .send()
        .await
        .expect("Failed to request dashboard");

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), Some("/"));
    let cleared = session_cookie(&resp).expect("cookie cleared");
    assert_eq!(cleared, "@nextauth.token=");
    assert_eq!(ctx.calls.me(), 1);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_category_page_lists_products() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .get(ctx.url(&format!("/category?category_id={PIZZAS}")))
        .header(COOKIE, format!("@nextauth.token={GOOD_TOKEN}"))
        .send()
        .await
        .expect("Failed to request category page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Pizzas"));
    assert!(body.contains("Margherita"));
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_cookie() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .client
        .post(ctx.url("/logout"))
        .header(COOKIE, format!("@nextauth.token={GOOD_TOKEN}"))
        .send()
        .await
        .expect("Failed to log out");

    assert!(resp.status().is_redirection());
    assert_eq!(location(&resp), Some("/"));
    let cleared = session_cookie(&resp).expect("cookie cleared");
    assert_eq!(cleared, "@nextauth.token=");
}

// ============================================================================
// Live stack
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API, database, and dashboard"]
async fn test_live_sign_in_round_trip() {
    let base_url = std::env::var("STOREKEEP_DASHBOARD_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let email = std::env::var("STOREKEEP_TEST_EMAIL").unwrap_or_else(|_| EMAIL.to_string());
    let password =
        std::env::var("STOREKEEP_TEST_PASSWORD").unwrap_or_else(|_| PASSWORD.to_string());
    let client = no_redirect_client();

    let resp = client
        .post(format!("{base_url}/"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to sign in");
    assert_eq!(location(&resp), Some("/dashboard?toast=logged_in"));
    let cookie = session_cookie(&resp).expect("session cookie set");

    let page = client
        .get(format!("{base_url}/dashboard"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .expect("Failed to load dashboard");
    assert_eq!(page.status(), StatusCode::OK);
}
