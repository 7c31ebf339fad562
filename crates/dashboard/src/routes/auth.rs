//! Sign-in, sign-up and sign-out.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::instrument;

use super::{new_nonce, paths};
use crate::error::Result;
use crate::middleware::ClientIp;
use crate::session::{
    AuthController, AuthOutcome, ServerSideResult, SessionCookie, SessionState, can_ssr_guest,
};
use crate::state::AppState;
use crate::toast::{Toast, ToastQuery};

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub nonce: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub nonce: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "signin.html")]
pub struct SignInTemplate {
    pub toast: Option<Toast>,
    pub email: String,
    pub nonce: String,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignUpTemplate {
    pub toast: Option<Toast>,
    pub name: String,
    pub email: String,
    pub nonce: String,
}

/// Apply an outcome's cookie change and navigation; `None` if the outcome
/// stays on the current page.
fn follow(outcome: &AuthOutcome, secure: bool) -> (SessionCookie, Option<Redirect>) {
    let cookie = outcome.cookie.clone().apply(secure);
    let redirect = outcome.navigate.map(|path| {
        let destination = outcome
            .toast
            .map_or_else(|| path.to_owned(), |toast| toast.redirect_path(path));
        Redirect::to(&destination)
    });
    (cookie, redirect)
}

/// Key for an in-flight submission. A form posted without a nonce gets a
/// fresh one so it never shares a slot with other nonce-less posts.
fn submission_key(form: &str, nonce: &str) -> String {
    if nonce.is_empty() {
        format!("{form}:{}", new_nonce())
    } else {
        format!("{form}:{nonce}")
    }
}

// =============================================================================
// Sign In
// =============================================================================

/// Display the sign-in page.
pub async fn sign_in_page(
    jar: CookieJar,
    Query(query): Query<ToastQuery>,
) -> Result<(SessionCookie, ServerSideResult<SignInTemplate>)> {
    let toast = query.toast();
    let page = can_ssr_guest(&jar, |_| async move {
        Ok(SignInTemplate {
            toast,
            email: String::new(),
            nonce: new_nonce(),
        })
    })
    .await?;
    Ok(page)
}

/// Handle sign-in form submission.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn sign_in(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Form(form): Form<SignInForm>,
) -> Response {
    let controller = AuthController::new(state.sessions()).for_client(client_ip);
    let key = submission_key("signin", &form.nonce);

    let outcome = state
        .slots()
        .run(
            &key,
            controller.sign_in(SessionState::anonymous(), &form.email, &form.password),
        )
        .await;

    let Some(outcome) = outcome else {
        // Superseded by a newer submission: no cookie, no toast
        return SignInTemplate {
            toast: None,
            email: form.email,
            nonce: new_nonce(),
        }
        .into_response();
    };

    match follow(&outcome, state.cookie_secure()) {
        (cookie, Some(redirect)) => (cookie, redirect).into_response(),
        (cookie, None) => (
            cookie,
            SignInTemplate {
                toast: outcome.toast,
                email: form.email,
                nonce: new_nonce(),
            },
        )
            .into_response(),
    }
}

// =============================================================================
// Sign Up
// =============================================================================

/// Display the sign-up page.
pub async fn sign_up_page(
    jar: CookieJar,
    Query(query): Query<ToastQuery>,
) -> Result<(SessionCookie, ServerSideResult<SignUpTemplate>)> {
    let toast = query.toast();
    let page = can_ssr_guest(&jar, |_| async move {
        Ok(SignUpTemplate {
            toast,
            name: String::new(),
            email: String::new(),
            nonce: new_nonce(),
        })
    })
    .await?;
    Ok(page)
}

/// Handle sign-up form submission.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn sign_up(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Form(form): Form<SignUpForm>,
) -> Response {
    let controller = AuthController::new(state.sessions()).for_client(client_ip);
    let key = submission_key("signup", &form.nonce);

    let outcome = state
        .slots()
        .run(
            &key,
            controller.sign_up(
                SessionState::anonymous(),
                &form.name,
                &form.email,
                &form.password,
            ),
        )
        .await;

    let toast = match outcome {
        Some(outcome) => match follow(&outcome, state.cookie_secure()) {
            (cookie, Some(redirect)) => return (cookie, redirect).into_response(),
            (_, None) => outcome.toast,
        },
        None => None,
    };

    SignUpTemplate {
        toast,
        name: form.name,
        email: form.email,
        nonce: new_nonce(),
    }
    .into_response()
}

// =============================================================================
// Sign Out
// =============================================================================

/// Sign out: drop the cookie and return to the sign-in page.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    let outcome = AuthController::new(state.sessions()).sign_out();
    let (cookie, redirect) = follow(&outcome, state.cookie_secure());
    let redirect = redirect.unwrap_or_else(|| Redirect::to(paths::SIGN_IN));
    (cookie, redirect).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posted_nonce_keys_the_submission() {
        assert_eq!(submission_key("signin", "n1"), "signin:n1");
    }

    #[test]
    fn test_missing_nonce_gets_a_private_key() {
        let a = submission_key("signin", "");
        let b = submission_key("signin", "");

        assert_ne!(a, "signin:");
        assert!(a.starts_with("signin:"));
        assert_ne!(a, b);
    }
}
