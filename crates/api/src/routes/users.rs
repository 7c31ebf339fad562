//! Account registration.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use storekeep_core::{CreateUserRequest, UserProfile};

use crate::error::Result;
use crate::services::AuthService;
use crate::state::AppState;

/// Register a staff account. The new user is not signed in.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth.register(&body.name, &body.email, &body.password).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}
