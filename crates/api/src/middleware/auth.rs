//! Bearer token authentication.
//!
//! The token is read from `Authorization: Bearer <token>`, falling back to the
//! session cookie when no header is sent.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use storekeep_core::{SESSION_COOKIE, UserId};

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a valid session token.
///
/// Rejects with `401 {"error": "..."}` when the token is missing, forged, or
/// expired.
///
/// ```rust,ignore
/// async fn handler(RequireUser(user_id): RequireUser) -> String {
///     user_id.to_string()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireUser(pub UserId);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_token(&parts.headers))
            .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

        let claims = state.tokens().verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "rejected session token");
            AppError::Unauthorized("Invalid token".to_string())
        })?;

        set_sentry_user(&claims.sub, None);
        Ok(Self(claims.sub))
    }
}

/// Token from an `Authorization: Bearer` header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

/// Token from the session cookie, if any.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}
