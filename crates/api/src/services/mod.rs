//! Business logic services for the API.
//!
//! - `auth` - Password registration/login and session tokens
//! - `catalog` - Product lookups by category
//! - `uploads` - Banner image storage

pub mod auth;
pub mod catalog;
pub mod uploads;

pub use auth::{AuthError, AuthService, TokenSigner};
pub use catalog::{ListByCategoryService, ProductStore};
pub use uploads::{UploadError, UploadStore};
