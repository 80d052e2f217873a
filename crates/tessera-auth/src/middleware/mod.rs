//! HTTP middleware for authentication.
//!
//! This module provides Axum extractors for:
//!
//! - Bearer token extraction and validation
//! - Optional authentication for public endpoints
//! - OAuth 2.0 style error responses
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use tessera_auth::middleware::{AuthState, BearerIdentity, require_service};
//!
//! async fn internal_handler(BearerIdentity(identity): BearerIdentity) -> Result<String, AuthRejection> {
//!     require_service(&identity)?;
//!     Ok(format!("Hello, {}!", identity.subject()))
//! }
//!
//! let app = Router::new()
//!     .route("/internal", get(internal_handler))
//!     .with_state(AuthState::new(token_service));
//! ```

pub mod auth;
pub mod error;

pub use auth::{
    AuthState, BearerIdentity, OptionalBearerIdentity, extract_bearer, require_role,
    require_service, resolve_bearer,
};
pub use error::{AuthRejection, REALM};
