//! Browser session: the token cookie, the auth controller, and page guards.
//!
//! The signed token issued by `POST /session` lives in the `@nextauth.token`
//! cookie for 30 days and is sent back to the backend as a bearer credential
//! on every call a page makes.

pub mod controller;
pub mod guard;
pub mod inflight;

pub use controller::{AuthController, AuthOutcome, SessionState, SessionUser};
pub use guard::{
    LoaderError, LoaderErrorKind, PageContext, ServerSideResult, can_ssr_auth, can_ssr_guest,
};
pub use inflight::{RequestSlots, Ticket};

use std::convert::Infallible;

use axum::http::{HeaderValue, header::SET_COOKIE};
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use storekeep_core::{SESSION_COOKIE, SESSION_MAX_AGE_SECS};

/// The session token carried by the request, if any.
#[must_use]
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(Cookie::value)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Response part that sets (or expires) the session cookie.
///
/// Written with the cookie's literal name: `CookieJar` percent-encodes names
/// on output, which would store `%40nextauth.token` in the browser.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionCookie(Option<Cookie<'static>>);

impl SessionCookie {
    /// Leave the browser's cookie as it is.
    #[must_use]
    pub const fn unchanged() -> Self {
        Self(None)
    }

    /// Set the token site-wide for 30 days.
    #[must_use]
    pub fn store(token: String, secure: bool) -> Self {
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
            .build();
        Self(Some(cookie))
    }

    /// Expire the cookie. Harmless when none was set.
    #[must_use]
    pub fn destroy() -> Self {
        let cookie = Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::ZERO)
            .build();
        Self(Some(cookie))
    }

    /// The cookie this response will set, if any.
    #[must_use]
    pub const fn cookie(&self) -> Option<&Cookie<'static>> {
        self.0.as_ref()
    }
}

impl IntoResponseParts for SessionCookie {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(cookie) = self.0 {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    res.headers_mut().append(SET_COOKIE, value);
                }
                Err(e) => tracing::error!(error = %e, "session cookie is not a valid header"),
            }
        }
        Ok(res)
    }
}

/// What a session command does to the cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Keep,
    Store(String),
    Destroy,
}

impl CookieChange {
    /// The response part carrying this change.
    #[must_use]
    pub fn apply(self, secure: bool) -> SessionCookie {
        match self {
            Self::Keep => SessionCookie::unchanged(),
            Self::Store(token) => SessionCookie::store(token, secure),
            Self::Destroy => SessionCookie::destroy(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use axum::http::{HeaderMap, header::COOKIE};
    use axum::response::IntoResponse;

    fn jar_with(cookie: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(cookie));
        CookieJar::from_headers(&headers)
    }

    fn set_cookie(part: SessionCookie) -> Option<String> {
        let response = (part, "ok").into_response();
        response
            .headers()
            .get(SET_COOKIE)
            .map(|v| v.to_str().unwrap().to_owned())
    }

    #[test]
    fn test_session_token_reads_cookie() {
        let jar = jar_with("@nextauth.token=abc.def; other=1");
        assert_eq!(session_token(&jar).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_session_token_absent() {
        assert_eq!(session_token(&CookieJar::new()), None);
    }

    #[test]
    fn test_empty_cookie_is_no_session() {
        assert_eq!(session_token(&jar_with("@nextauth.token=")), None);
    }

    #[test]
    fn test_store_attributes() {
        let part = SessionCookie::store("tok".into(), true);
        let cookie = part.cookie().unwrap();

        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(2_592_000)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn test_store_header_uses_literal_name() {
        let header = set_cookie(SessionCookie::store("tok".into(), false)).unwrap();

        assert!(header.starts_with("@nextauth.token=tok;"), "{header}");
        assert!(header.contains("Max-Age=2592000"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
    }

    #[test]
    fn test_stored_header_reads_back() {
        let header = set_cookie(SessionCookie::store("abc.def".into(), false)).unwrap();
        let pair = header.split(';').next().unwrap().to_owned();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&pair).unwrap());
        assert_eq!(
            session_token(&CookieJar::from_headers(&headers)).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn test_destroy_expires_cookie() {
        let header = set_cookie(SessionCookie::destroy()).unwrap();

        assert!(header.starts_with("@nextauth.token=;"), "{header}");
        assert!(header.contains("Max-Age=0"));
    }

    #[test]
    fn test_keep_sets_nothing() {
        assert_eq!(set_cookie(CookieChange::Keep.apply(false)), None);
    }

    #[test]
    fn test_changes_map_to_parts() {
        assert_eq!(
            CookieChange::Store("t".into()).apply(false),
            SessionCookie::store("t".into(), false)
        );
        assert_eq!(CookieChange::Destroy.apply(true), SessionCookie::destroy());
    }
}
