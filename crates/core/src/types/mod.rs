//! Core types for Storekeep.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod wire;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use wire::*;
