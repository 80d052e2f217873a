//! Token generation, validation, and key handling.
//!
//! This module provides:
//!
//! - Signing key derivation from a base64 secret
//! - The claim set carried by every token
//! - JWT encoding and decoding
//! - The token service used by applications

pub mod claims;
pub mod codec;
pub mod key;
pub mod service;

pub use claims::{ClaimSet, ROLE_SERVICE, TokenType};
pub use codec::TokenCodec;
pub use key::{MIN_SECRET_BYTES, SigningAlgorithm, SigningKey, derive, generate_secret};
pub use service::TokenService;
