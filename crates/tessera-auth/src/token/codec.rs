//! JWT encoding and decoding.
//!
//! [`TokenCodec`] turns a [`ClaimSet`] into a compact HMAC-signed JWT and
//! back. Decoding always verifies the signature before any claim is read;
//! expiry is checked afterwards so an expired token can be told apart from a
//! forged one.
//!
//! ## Example
//!
//! ```ignore
//! use tessera_auth::token::{SigningKey, TokenCodec};
//!
//! let codec = TokenCodec::new(SigningKey::derive(&secret)?);
//!
//! let token = codec.encode(&claims)?;
//! let decoded = codec.decode(&token)?;
//! ```

use jsonwebtoken::{Header, Validation, decode, encode};
use time::OffsetDateTime;

use crate::error::TokenError;
use crate::token::claims::ClaimSet;
use crate::token::key::{SigningAlgorithm, SigningKey};

/// Encodes and decodes signed tokens with a single symmetric key.
///
/// This codec is thread-safe (`Send + Sync`) and holds no mutable state.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
}

impl TokenCodec {
    /// Creates a codec for `key`.
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Encodes claims into a signed JWT string.
    ///
    /// # Errors
    /// - `TokenError::Validation` if the subject or role is empty.
    /// - `TokenError::Encoding` if the claims cannot be serialized or signed.
    pub fn encode(&self, claims: &ClaimSet) -> Result<String, TokenError> {
        claims.validate().map_err(TokenError::validation)?;

        let header = Header::new(self.key.algorithm().to_jwt_algorithm());

        encode(&header, claims, self.key.encoding_key())
            .map_err(|e| TokenError::encoding(e.to_string()))
    }

    /// Decodes and validates a JWT string.
    ///
    /// # Errors
    /// - `TokenError::Unsupported` if the token is malformed, its signature
    ///   does not verify, or its claims are missing or invalid.
    /// - `TokenError::Expired` if the signature is valid but the token has
    ///   reached its expiry.
    pub fn decode(&self, token: &str) -> Result<ClaimSet, TokenError> {
        let claims = self.verify(token)?;

        if claims.is_expired_at(OffsetDateTime::now_utc()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Decodes a JWT without checking expiry (useful for inspection).
    ///
    /// # Errors
    /// Returns `TokenError::Unsupported` if decoding fails; the signature is
    /// still verified.
    pub fn decode_allow_expired(&self, token: &str) -> Result<ClaimSet, TokenError> {
        self.verify(token)
    }

    /// Returns the algorithm tokens are signed with.
    #[must_use]
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.key.algorithm()
    }

    fn verify(&self, token: &str) -> Result<ClaimSet, TokenError> {
        let mut validation = Validation::new(self.key.algorithm().to_jwt_algorithm());
        // Expiry is checked by the caller with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<ClaimSet>(token, self.key.decoding_key(), &validation)?.claims;
        claims.validate().map_err(TokenError::unsupported)?;

        Ok(claims)
    }
}
