//! Signed-in overview.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::error::Result;
use crate::session::{
    AuthController, LoaderError, ServerSideResult, SessionCookie, SessionUser, can_ssr_auth,
};
use crate::state::AppState;
use crate::toast::{Toast, ToastQuery};

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub toast: Option<Toast>,
    pub user: SessionUser,
}

/// Show the dashboard for the restored session.
///
/// A token the backend no longer accepts signs the user out.
#[instrument(skip(state, jar, query))]
pub async fn show(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ToastQuery>,
) -> Result<(SessionCookie, ServerSideResult<DashboardTemplate>)> {
    let toast = query.toast();
    let page = can_ssr_auth(&jar, move |ctx| async move {
        let outcome = AuthController::new(state.sessions())
            .restore(Some(&ctx.token))
            .await;
        let user = outcome.state.user.ok_or(LoaderError::SessionExpired)?;
        Ok(DashboardTemplate { toast, user })
    })
    .await?;
    Ok(page)
}
