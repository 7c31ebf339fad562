//! Subcommand implementations.

pub mod category;
pub mod migrate;
pub mod user;

use secrecy::SecretString;
use sqlx::PgPool;

use storekeep_api::db::create_pool;

/// Resolve the API database URL, falling back to the generic `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("API_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}

/// Connect to the API database.
///
/// Returns `None` when neither `API_DATABASE_URL` nor `DATABASE_URL` is set.
async fn connect() -> Option<Result<PgPool, sqlx::Error>> {
    let url = database_url()?;
    tracing::info!("Connecting to API database...");
    Some(create_pool(&url).await)
}
