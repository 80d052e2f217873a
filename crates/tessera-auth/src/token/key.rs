//! Signing key derivation.
//!
//! Tokens are signed with an HMAC key derived from a base64 shared secret.
//! The algorithm follows the key length, so a longer secret automatically
//! gets a stronger hash:
//!
//! | decoded length | algorithm |
//! |---|---|
//! | 64 bytes or more | HS512 |
//! | 48 to 63 bytes | HS384 |
//! | 32 to 47 bytes | HS256 |
//!
//! Anything shorter than 32 bytes is rejected.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::error::TokenError;

/// Minimum decoded secret length in bytes (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

// ============================================================================
// Signing Algorithm
// ============================================================================

/// HMAC algorithms a derived key can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl SigningAlgorithm {
    /// Picks the strongest algorithm the key length supports.
    ///
    /// # Errors
    /// Returns `TokenError::KeyDerivation` if the key is shorter than
    /// [`MIN_SECRET_BYTES`].
    pub fn for_key_length(len: usize) -> Result<Self, TokenError> {
        match len {
            64.. => Ok(Self::HS512),
            48.. => Ok(Self::HS384),
            MIN_SECRET_BYTES.. => Ok(Self::HS256),
            _ => Err(TokenError::key_derivation(format!(
                "secret is {} bits, at least {} bits are required",
                len * 8,
                MIN_SECRET_BYTES * 8
            ))),
        }
    }

    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::HS256 => Algorithm::HS256,
            Self::HS384 => Algorithm::HS384,
            Self::HS512 => Algorithm::HS512,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Signing Key
// ============================================================================

/// A symmetric key used both to sign and to verify tokens.
///
/// Cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct SigningKey {
    algorithm: SigningAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Derives a signing key from a base64-encoded secret.
    ///
    /// Whitespace around the secret is ignored. The result depends only on
    /// `secret`, so deriving once and caching is equivalent to deriving on
    /// every call.
    ///
    /// # Errors
    /// - `TokenError::KeyDecoding` if the secret is empty or not valid base64.
    /// - `TokenError::KeyDerivation` if the decoded key is too short.
    pub fn derive(secret: &str) -> Result<Self, TokenError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(TokenError::key_decoding("secret is empty"));
        }

        let bytes = STANDARD
            .decode(secret)
            .map_err(|e| TokenError::key_decoding(e.to_string()))?;

        Self::from_bytes(&bytes)
    }

    /// Builds a signing key from raw key material.
    ///
    /// # Errors
    /// Returns `TokenError::KeyDerivation` if the key is too short.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TokenError> {
        let algorithm = SigningAlgorithm::for_key_length(bytes.len())?;

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
        })
    }

    /// Returns the HMAC algorithm selected for this key.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Derives a signing key from a base64-encoded secret.
///
/// Shorthand for [`SigningKey::derive`].
///
/// # Errors
/// See [`SigningKey::derive`].
pub fn derive(secret: &str) -> Result<SigningKey, TokenError> {
    SigningKey::derive(secret)
}

/// Generates a random secret of `len` bytes, base64-encoded.
///
/// # Errors
/// Returns `TokenError::KeyDerivation` if `len` is below [`MIN_SECRET_BYTES`].
pub fn generate_secret(len: usize) -> Result<String, TokenError> {
    SigningAlgorithm::for_key_length(len)?;

    let mut bytes = vec![0u8; len];
    rand::Rng::fill(&mut rand::thread_rng(), bytes.as_mut_slice());
    Ok(STANDARD.encode(bytes))
}
