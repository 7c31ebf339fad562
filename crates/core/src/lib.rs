//! Storekeep Core - Shared types library.
//!
//! This crate provides common types used across all Storekeep components:
//! - `api` - REST backend over the users/categories/products schema
//! - `dashboard` - Server-rendered staff dashboard
//! - `cli` - Command-line tools for migrations and bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. The backend and the dashboard agree on the wire format
//! through the types in [`types::wire`].
//!
//! # Modules
//!
//! - [`types`] - Newtype identifiers, emails, prices, and request/response bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
