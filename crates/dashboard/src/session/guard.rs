//! Server-side page guards.
//!
//! A page handler hands its loader to [`can_ssr_auth`] (signed-in pages) or
//! [`can_ssr_guest`] (sign-in and sign-up). The guard inspects the session
//! cookie before the loader runs and decides between rendering the loader's
//! props and redirecting.

use std::future::Future;

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;

use super::{SessionCookie, session_token};
use crate::api::ApiError;
use crate::routes::paths;

/// What a guarded loader gets to work with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Bearer token for backend calls. Empty for guest pages.
    pub token: String,
}

/// Coarse classification of loader failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderErrorKind {
    /// The session token is missing, expired or rejected.
    AuthToken,
    /// The backend failed for another reason.
    Backend,
    Other,
}

/// Failure of a page loader.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("session expired")]
    SessionExpired,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Other(String),
}

impl LoaderError {
    #[must_use]
    pub fn kind(&self) -> LoaderErrorKind {
        match self {
            Self::SessionExpired => LoaderErrorKind::AuthToken,
            Self::Api(e) if e.is_unauthorized() => LoaderErrorKind::AuthToken,
            Self::Api(_) => LoaderErrorKind::Backend,
            Self::Other(_) => LoaderErrorKind::Other,
        }
    }
}

/// Outcome of a guarded loader.
#[derive(Debug, PartialEq, Eq)]
pub enum ServerSideResult<P> {
    Props(P),
    Redirect { destination: String, permanent: bool },
}

impl<P> ServerSideResult<P> {
    /// Temporary redirect.
    #[must_use]
    pub fn redirect(destination: impl Into<String>) -> Self {
        Self::Redirect {
            destination: destination.into(),
            permanent: false,
        }
    }
}

impl<P: IntoResponse> IntoResponse for ServerSideResult<P> {
    fn into_response(self) -> Response {
        match self {
            Self::Props(page) => page.into_response(),
            Self::Redirect {
                destination,
                permanent: true,
            } => Redirect::permanent(&destination).into_response(),
            Self::Redirect { destination, .. } => Redirect::to(&destination).into_response(),
        }
    }
}

/// Guard for signed-in pages.
///
/// - no session cookie: redirect to `/`, the loader never runs
/// - loader fails with [`LoaderErrorKind::AuthToken`]: the cookie is
///   destroyed and the user is sent to `/`
/// - any other loader error is returned to the caller
///
/// # Errors
///
/// Returns the loader's error unless it is an auth-token error.
pub async fn can_ssr_auth<P, F, Fut>(
    jar: &CookieJar,
    loader: F,
) -> Result<(SessionCookie, ServerSideResult<P>), LoaderError>
where
    F: FnOnce(PageContext) -> Fut,
    Fut: Future<Output = Result<P, LoaderError>>,
{
    let Some(token) = session_token(jar) else {
        return Ok((
            SessionCookie::unchanged(),
            ServerSideResult::redirect(paths::SIGN_IN),
        ));
    };

    match loader(PageContext { token }).await {
        Ok(props) => Ok((SessionCookie::unchanged(), ServerSideResult::Props(props))),
        Err(e) if e.kind() == LoaderErrorKind::AuthToken => {
            tracing::info!(error = %e, "session token rejected, clearing cookie");
            Ok((
                SessionCookie::destroy(),
                ServerSideResult::redirect(paths::SIGN_IN),
            ))
        }
        Err(e) => Err(e),
    }
}

/// Guard for guest-only pages: a session cookie sends the user to the
/// dashboard without running the loader.
///
/// # Errors
///
/// Returns the loader's error.
pub async fn can_ssr_guest<P, F, Fut>(
    jar: &CookieJar,
    loader: F,
) -> Result<(SessionCookie, ServerSideResult<P>), LoaderError>
where
    F: FnOnce(PageContext) -> Fut,
    Fut: Future<Output = Result<P, LoaderError>>,
{
    if session_token(jar).is_some() {
        return Ok((
            SessionCookie::unchanged(),
            ServerSideResult::redirect(paths::DASHBOARD),
        ));
    }

    let props = loader(PageContext {
        token: String::new(),
    })
    .await?;
    Ok((SessionCookie::unchanged(), ServerSideResult::Props(props)))
}
