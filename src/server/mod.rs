//! HTTP server
//!
//! This module provides a `ServerBuilder` that assembles:
//! - the shared [`AppState`] from configuration and collaborators
//! - the route table under [`API_PREFIX`]
//! - the tracing, panic-catching and CORS middleware

pub mod builder;
pub mod handlers;
pub mod host;
pub mod router;

pub use builder::{ServerBuilder, app};
pub use host::AppState;

/// Version segment of every route
pub const API_VERSION: &str = "v1";

/// Prefix under which every route is mounted
pub const API_PREFIX: &str = "/api/v1";
