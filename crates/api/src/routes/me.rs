//! Current user.

use axum::{Json, extract::State};
use tracing::instrument;

use storekeep_core::UserProfile;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Profile of the user the bearer token belongs to.
#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<UserProfile>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth.current_user(&user_id).await?;

    Ok(Json(user.into()))
}
