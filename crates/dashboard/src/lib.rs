//! Storekeep dashboard library.
//!
//! Server-rendered staff pages over the REST backend. Exposed as a library so
//! the router can be exercised in integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;
pub mod toast;
