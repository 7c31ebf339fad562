//! Domain models for the API.
//!
//! These are validated domain objects, separate from database row types and
//! from the wire types in `storekeep_core`.

pub mod catalog;
pub mod user;

pub use catalog::{Category, Product};
pub use user::User;
