//! User account commands.
//!
//! # Usage
//!
//! ```bash
//! storekeep user create -n "Alice" -e alice@example.com -p calabresa
//! ```

use thiserror::Error;

use storekeep_api::db::RepositoryError;
use storekeep_api::db::users::UserRepository;
use storekeep_api::services::auth::{MIN_PASSWORD_LENGTH, hash_password};
use storekeep_core::Email;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: API_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    /// Blank name.
    #[error("Name is required")]
    MissingName,

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Hashing failed.
    #[error("Failed to hash password")]
    PasswordHash,

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

/// Create a user account that can sign in to the dashboard.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `UserError` if the input is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create(name: &str, email: &str, password: &str) -> Result<String, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::MissingName);
    }
    let parsed = Email::parse(email).map_err(|_| UserError::InvalidEmail(email.to_owned()))?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(UserError::WeakPassword);
    }
    let password_hash = hash_password(password).map_err(|_| UserError::PasswordHash)?;

    let pool = super::connect().await.ok_or(UserError::MissingDatabaseUrl)??;

    tracing::info!("Creating user: {}", parsed);
    let user = UserRepository::new(&pool)
        .create(name, &parsed, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(parsed.to_string()),
            other => UserError::Repository(other),
        })?;

    tracing::info!("User created successfully! ID: {}, Email: {}", user.id, user.email);
    Ok(user.id.to_string())
}
