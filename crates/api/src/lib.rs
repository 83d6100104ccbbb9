//! HTTP API layer for quill.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: users, authentication, posts, reactions, device
//!   registration
//! - **Extractors**: the authenticated identity
//! - **Middleware**: bearer-token authentication
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
