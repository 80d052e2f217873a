//! # tessera-auth
//!
//! Stateless identity tokens for services and their users.
//!
//! This crate provides:
//! - Signing key derivation from a shared base64 secret
//! - Signed access, refresh and service tokens (HMAC JWT)
//! - Parsing with signature, expiry and token type enforcement
//! - Axum extractors that turn a bearer credential into an [`Identity`]
//!
//! ## Overview
//!
//! Every token is self-contained: its validity depends only on its signature
//! and expiry. There is no server-side session or revocation state, so any
//! number of instances sharing the same secret can issue and verify tokens.
//!
//! ## Modules
//!
//! - [`config`] - Token service configuration
//! - [`error`] - Error types
//! - [`identity`] - The authenticated principal
//! - [`token`] - Key derivation, claims, codec and token service
//! - [`middleware`] - HTTP extractors for bearer authentication

pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod token;

pub use config::{ConfigError, TokenConfig};
pub use error::{ErrorCategory, TokenError};
pub use identity::Identity;
pub use middleware::{
    AuthRejection, AuthState, BearerIdentity, OptionalBearerIdentity, require_role,
    require_service, resolve_bearer,
};
pub use token::{
    ClaimSet, ROLE_SERVICE, SigningAlgorithm, SigningKey, TokenCodec, TokenService, TokenType,
};

/// Type alias for token results.
pub type TokenResult<T> = Result<T, TokenError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tessera_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::TokenResult;
    pub use crate::config::{ConfigError, TokenConfig};
    pub use crate::error::{ErrorCategory, TokenError};
    pub use crate::identity::Identity;
    pub use crate::middleware::{
        AuthRejection, AuthState, BearerIdentity, OptionalBearerIdentity, require_role,
        require_service, resolve_bearer,
    };
    pub use crate::token::{
        ClaimSet, ROLE_SERVICE, SigningAlgorithm, SigningKey, TokenCodec, TokenService, TokenType,
    };
}
