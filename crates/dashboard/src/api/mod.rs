//! Backend API access.
//!
//! The dashboard never touches the database; every read and write goes through
//! the REST backend. Handlers depend on the [`SessionApi`] and [`CatalogApi`]
//! traits so they can be exercised against in-memory fakes.

mod client;

pub use client::ApiClient;

use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;

use storekeep_core::{CategorySummary, ProductListing, SessionGrant, UserProfile};

/// Errors returned by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or undecodable body.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected the bearer token (or the credentials).
    #[error("invalid token")]
    Unauthorized,

    /// Any other non-success status.
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl ApiError {
    /// Whether the backend answered 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// A banner image chosen in the product form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields of `POST /product`.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category_id: String,
    pub image: ImageUpload,
}

/// Accounts and sessions.
///
/// The credential calls carry the browser's address so the backend can rate
/// limit each browser rather than the dashboard as a whole.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// `POST /session`
    async fn create_session(
        &self,
        email: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> Result<SessionGrant, ApiError>;

    /// `POST /users`
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        client_ip: Option<IpAddr>,
    ) -> Result<UserProfile, ApiError>;

    /// `GET /me`
    async fn me(&self, token: &str) -> Result<UserProfile, ApiError>;
}

/// Categories and products. Every call carries the bearer token.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /category`
    async fn list_categories(&self, token: &str) -> Result<Vec<CategorySummary>, ApiError>;

    /// `POST /category`
    async fn create_category(&self, token: &str, name: &str) -> Result<CategorySummary, ApiError>;

    /// `GET /category/product?category_id=`
    async fn products_by_category(
        &self,
        token: &str,
        category_id: &str,
    ) -> Result<Vec<ProductListing>, ApiError>;

    /// `POST /product` (multipart)
    async fn create_product(
        &self,
        token: &str,
        product: NewProduct,
    ) -> Result<ProductListing, ApiError>;
}
