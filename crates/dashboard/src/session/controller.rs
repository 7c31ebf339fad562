//! The auth controller.
//!
//! Session state is an explicit value. Each command takes the current state
//! and returns an [`AuthOutcome`]: the next state plus the side effects the
//! route handler applies (cookie change, toast, navigation). The backend
//! client is injected, so the controller is tested against fakes.

use std::net::IpAddr;

use tracing::instrument;

use storekeep_core::{Email, SessionGrant, UserId, UserProfile};

use super::CookieChange;
use crate::api::SessionApi;
use crate::routes::paths;
use crate::toast::Toast;

/// The signed-in staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

impl From<UserProfile> for SessionUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
        }
    }
}

impl From<&SessionGrant> for SessionUser {
    fn from(grant: &SessionGrant) -> Self {
        Self {
            id: grant.id.clone(),
            name: grant.name.clone(),
            email: grant.email.clone(),
        }
    }
}

/// Who the current request belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<SessionUser>,
}

impl SessionState {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user: None }
    }

    #[must_use]
    pub const fn signed_in(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    /// True iff a user record is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Result of a session command.
///
/// Handlers apply `cookie` first, then show `toast` and follow `navigate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub state: SessionState,
    pub cookie: CookieChange,
    pub toast: Option<Toast>,
    pub navigate: Option<&'static str>,
}

impl AuthOutcome {
    fn unchanged(state: SessionState, toast: Option<Toast>) -> Self {
        Self {
            state,
            cookie: CookieChange::Keep,
            toast,
            navigate: None,
        }
    }
}

/// Runs sign-in, sign-up, sign-out and session restore against the backend.
pub struct AuthController<'a> {
    api: &'a dyn SessionApi,
    client_ip: Option<IpAddr>,
}

impl<'a> AuthController<'a> {
    #[must_use]
    pub const fn new(api: &'a dyn SessionApi) -> Self {
        Self {
            api,
            client_ip: None,
        }
    }

    /// Forward `client_ip` with credential calls.
    #[must_use]
    pub fn for_client(mut self, client_ip: Option<IpAddr>) -> Self {
        self.client_ip = client_ip;
        self
    }

    /// Exchange credentials for a token.
    ///
    /// Success stores the token cookie, records the user and heads to the
    /// dashboard. Any failure keeps `state` as it was.
    #[instrument(skip(self, state, password))]
    pub async fn sign_in(&self, state: SessionState, email: &str, password: &str) -> AuthOutcome {
        match self.api.create_session(email, password, self.client_ip).await {
            Ok(grant) => {
                tracing::info!(user_id = %grant.id, "signed in");
                AuthOutcome {
                    state: SessionState::signed_in(SessionUser::from(&grant)),
                    cookie: CookieChange::Store(grant.token),
                    toast: Some(Toast::LoggedIn),
                    navigate: Some(paths::DASHBOARD),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign in failed");
                AuthOutcome::unchanged(state, Some(Toast::AccessError))
            }
        }
    }

    /// Register an account. Does not sign the new user in.
    #[instrument(skip(self, state, password))]
    pub async fn sign_up(
        &self,
        state: SessionState,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthOutcome {
        match self.api.create_user(name, email, password, self.client_ip).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account created");
                AuthOutcome {
                    state,
                    cookie: CookieChange::Keep,
                    toast: Some(Toast::AccountCreated),
                    navigate: Some(paths::SIGN_IN),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign up failed");
                AuthOutcome::unchanged(state, Some(Toast::RegisterError))
            }
        }
    }

    /// Drop the session. Never fails, with or without a cookie.
    #[must_use]
    pub fn sign_out(&self) -> AuthOutcome {
        AuthOutcome {
            state: SessionState::anonymous(),
            cookie: CookieChange::Destroy,
            toast: None,
            navigate: Some(paths::SIGN_IN),
        }
    }

    /// Rebuild the session from a stored token.
    ///
    /// No token means anonymous with no effects. A token the backend won't
    /// resolve (for any reason) signs the user out.
    #[instrument(skip(self, token))]
    pub async fn restore(&self, token: Option<&str>) -> AuthOutcome {
        let Some(token) = token else {
            return AuthOutcome::unchanged(SessionState::anonymous(), None);
        };

        match self.api.me(token).await {
            Ok(profile) => AuthOutcome::unchanged(SessionState::signed_in(profile.into()), None),
            Err(e) => {
                tracing::info!(error = %e, "stored session rejected, signing out");
                self.sign_out()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::api::ApiError;

    /// Fake backend: one account, records calls.
    #[derive(Default)]
    struct FakeSessions {
        calls: Mutex<Vec<&'static str>>,
        client_ips: Mutex<Vec<Option<IpAddr>>>,
        me_fails_with: Option<u16>,
    }

    fn alice() -> UserProfile {
        UserProfile {
            id: UserId::new("user-1"),
            name: "Alice".into(),
            email: Email::parse("alice@example.com").unwrap(),
        }
    }

    #[async_trait]
    impl SessionApi for FakeSessions {
        async fn create_session(
            &self,
            email: &str,
            password: &str,
            client_ip: Option<IpAddr>,
        ) -> Result<SessionGrant, ApiError> {
            self.calls.lock().unwrap().push("session");
            self.client_ips.lock().unwrap().push(client_ip);
            if email == "alice@example.com" && password == "secret1" {
                let user = alice();
                Ok(SessionGrant {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                    token: "tok-1".into(),
                })
            } else {
                Err(ApiError::Unauthorized)
            }
        }

        async fn create_user(
            &self,
            name: &str,
            email: &str,
            _: &str,
            client_ip: Option<IpAddr>,
        ) -> Result<UserProfile, ApiError> {
            self.calls.lock().unwrap().push("users");
            self.client_ips.lock().unwrap().push(client_ip);
            if email == "alice@example.com" {
                return Err(ApiError::Status {
                    status: 409,
                    message: "An account with this email already exists".into(),
                });
            }
            Ok(UserProfile {
                id: UserId::new("user-2"),
                name: name.into(),
                email: Email::parse(email).unwrap(),
            })
        }

        async fn me(&self, token: &str) -> Result<UserProfile, ApiError> {
            self.calls.lock().unwrap().push("me");
            match self.me_fails_with {
                Some(401) => Err(ApiError::Unauthorized),
                Some(status) => Err(ApiError::Status {
                    status,
                    message: "down".into(),
                }),
                None if token == "tok-1" => Ok(alice()),
                None => Err(ApiError::Unauthorized),
            }
        }
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let api = FakeSessions::default();
        let outcome = AuthController::new(&api)
            .sign_in(SessionState::anonymous(), "alice@example.com", "secret1")
            .await;

        assert!(outcome.state.is_authenticated());
        assert_eq!(outcome.state.user.unwrap().name, "Alice");
        assert_eq!(outcome.cookie, CookieChange::Store("tok-1".into()));
        assert_eq!(outcome.toast, Some(Toast::LoggedIn));
        assert_eq!(outcome.navigate, Some("/dashboard"));
    }

    #[tokio::test]
    async fn test_sign_in_failure_preserves_previous_state() {
        let api = FakeSessions::default();
        let previous = SessionState::signed_in(alice().into());

        let outcome = AuthController::new(&api)
            .sign_in(previous.clone(), "alice@example.com", "wrong")
            .await;

        assert_eq!(outcome.state, previous);
        assert_eq!(outcome.cookie, CookieChange::Keep);
        assert_eq!(outcome.toast, Some(Toast::AccessError));
        assert_eq!(outcome.navigate, None);
    }

    #[tokio::test]
    async fn test_sign_up_does_not_authenticate() {
        let api = FakeSessions::default();
        let outcome = AuthController::new(&api)
            .sign_up(SessionState::anonymous(), "Bob", "bob@example.com", "secret1")
            .await;

        assert!(!outcome.state.is_authenticated());
        assert_eq!(outcome.cookie, CookieChange::Keep);
        assert_eq!(outcome.toast, Some(Toast::AccountCreated));
        assert_eq!(outcome.navigate, Some("/"));
    }

    #[tokio::test]
    async fn test_credential_calls_carry_browser_address() {
        let api = FakeSessions::default();
        let browser: IpAddr = "203.0.113.9".parse().unwrap();
        let controller = AuthController::new(&api).for_client(Some(browser));

        controller
            .sign_in(SessionState::anonymous(), "alice@example.com", "secret1")
            .await;
        controller
            .sign_up(SessionState::anonymous(), "Bob", "bob@example.com", "secret1")
            .await;

        assert_eq!(*api.client_ips.lock().unwrap(), vec![Some(browser); 2]);
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let api = FakeSessions::default();
        let outcome = AuthController::new(&api)
            .sign_up(SessionState::anonymous(), "Al", "alice@example.com", "secret1")
            .await;

        assert_eq!(outcome.toast, Some(Toast::RegisterError));
        assert_eq!(outcome.navigate, None);
    }

    #[test]
    fn test_sign_out() {
        let api = FakeSessions::default();
        let outcome = AuthController::new(&api).sign_out();

        assert!(!outcome.state.is_authenticated());
        assert_eq!(outcome.cookie, CookieChange::Destroy);
        assert_eq!(outcome.navigate, Some("/"));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_without_token_makes_no_call() {
        let api = FakeSessions::default();
        let outcome = AuthController::new(&api).restore(None).await;

        assert_eq!(outcome, AuthOutcome::unchanged(SessionState::anonymous(), None));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restore_valid_token() {
        let api = FakeSessions::default();
        let outcome = AuthController::new(&api).restore(Some("tok-1")).await;

        assert_eq!(outcome.state.user.unwrap().email.as_str(), "alice@example.com");
        assert_eq!(outcome.cookie, CookieChange::Keep);
        assert_eq!(outcome.navigate, None);
    }

    #[tokio::test]
    async fn test_restore_rejected_token_signs_out() {
        let api = FakeSessions::default();
        let outcome = AuthController::new(&api).restore(Some("stale")).await;

        assert!(!outcome.state.is_authenticated());
        assert_eq!(outcome.cookie, CookieChange::Destroy);
        assert_eq!(outcome.navigate, Some("/"));
    }

    #[tokio::test]
    async fn test_restore_backend_outage_also_signs_out() {
        let api = FakeSessions {
            me_fails_with: Some(502),
            ..FakeSessions::default()
        };
        let outcome = AuthController::new(&api).restore(Some("tok-1")).await;

        assert_eq!(outcome.cookie, CookieChange::Destroy);
    }
}
