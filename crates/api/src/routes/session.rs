//! Sign-in.

use axum::{Json, extract::State};
use tracing::instrument;

use storekeep_core::{SessionGrant, SessionRequest};

use crate::error::Result;
use crate::services::AuthService;
use crate::state::AppState;

/// Exchange email and password for a bearer token.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<SessionRequest>,
) -> Result<Json<SessionGrant>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let grant = auth.login(&body.email, &body.password).await?;

    Ok(Json(grant))
}
