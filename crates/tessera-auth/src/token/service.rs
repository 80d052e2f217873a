//! Token service for issuing and parsing identity tokens.
//!
//! This module provides the use-case API the rest of an application talks to:
//!
//! - Identity construction
//! - Access, refresh and service token generation
//! - Parsing with token type enforcement
//! - Refresh-for-access exchange
//!
//! # Usage
//!
//! ```ignore
//! use tessera_auth::{TokenConfig, TokenService, TokenType};
//!
//! let service = TokenService::new(TokenConfig::new(secret))?;
//!
//! let identity = service.create("alice", "ROLE_USER", user_id, TokenType::Access)?;
//! let token = service.generate_access_token(&identity)?;
//! let parsed = service.parse_access_token(&token)?;
//! ```

use time::Duration;
use uuid::Uuid;

use crate::config::TokenConfig;
use crate::error::TokenError;
use crate::identity::Identity;
use crate::token::claims::{ClaimSet, ROLE_SERVICE, TokenType};
use crate::token::codec::TokenCodec;
use crate::token::key::SigningKey;

/// Token service for generating and validating identity tokens.
///
/// The signing key is derived once at construction. The service holds no
/// mutable state, so a single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct TokenService {
    /// Codec bound to the derived signing key.
    codec: TokenCodec,

    /// Service configuration.
    config: TokenConfig,

    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenService {
    /// Creates a new token service, deriving the signing key from
    /// `config.secret`.
    ///
    /// # Errors
    /// Returns `TokenError::KeyDecoding` or `TokenError::KeyDerivation` if the
    /// secret cannot be turned into a signing key.
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        let key = SigningKey::derive(&config.secret)?;
        Ok(Self::with_key(key, config))
    }

    /// Creates a token service from an already derived key.
    ///
    /// `config.secret` is ignored.
    #[must_use]
    pub fn with_key(key: SigningKey, config: TokenConfig) -> Self {
        Self {
            codec: TokenCodec::new(key),
            access_lifetime: to_lifetime(config.access_token_lifetime),
            refresh_lifetime: to_lifetime(config.refresh_token_lifetime),
            config,
        }
    }

    /// Builds an identity after checking `subject` and `role`.
    ///
    /// # Errors
    /// Returns `TokenError::Validation` if `subject` or `role` is empty.
    pub fn create(
        &self,
        subject: impl Into<String>,
        role: impl Into<String>,
        id: Uuid,
        token_type: TokenType,
    ) -> Result<Identity, TokenError> {
        Identity::new(subject, role, id, token_type)
    }

    /// Generates an access token for `identity`.
    ///
    /// # Errors
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn generate_access_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity, TokenType::Access)
    }

    /// Generates a refresh token for `identity`.
    ///
    /// # Errors
    /// Returns `TokenError::Encoding` if signing fails.
    pub fn generate_refresh_token(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity, TokenType::Refresh)
    }

    /// Generates an access token for machine-to-machine calls.
    ///
    /// The subject is the configured service name, the role is
    /// [`ROLE_SERVICE`] and the id is random for every call.
    ///
    /// # Errors
    /// Returns `TokenError::Validation` if the configured service name is
    /// empty, or `TokenError::Encoding` if signing fails.
    pub fn generate_service_token(&self) -> Result<String, TokenError> {
        let identity = Identity::new(
            self.config.service_name.as_str(),
            ROLE_SERVICE,
            Uuid::new_v4(),
            TokenType::Access,
        )?;
        self.issue(&identity, TokenType::Access)
    }

    /// Parses an access token into the identity it carries.
    ///
    /// # Errors
    /// - `TokenError::Unsupported` if the token is malformed or forged
    /// - `TokenError::Expired` if the token has expired
    /// - `TokenError::TypeMismatch` if the token is a refresh token
    pub fn parse_access_token(&self, token: &str) -> Result<Identity, TokenError> {
        self.parse(token, TokenType::Access)
    }

    /// Parses a refresh token into the identity it carries.
    ///
    /// # Errors
    /// - `TokenError::Unsupported` if the token is malformed or forged
    /// - `TokenError::Expired` if the token has expired
    /// - `TokenError::TypeMismatch` if the token is an access token
    pub fn parse_refresh_token(&self, token: &str) -> Result<Identity, TokenError> {
        self.parse(token, TokenType::Refresh)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// The new token carries the same subject, role and id. The refresh
    /// token stays valid until its own expiry; there is no rotation.
    ///
    /// # Errors
    /// Any error from [`TokenService::parse_refresh_token`], or
    /// `TokenError::Encoding` if signing fails.
    pub fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String, TokenError> {
        let identity = self.parse_refresh_token(refresh_token)?;
        self.generate_access_token(&identity)
    }

    /// Returns the codec used by this service.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the service configuration.
    #[must_use]
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    fn lifetime(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        }
    }

    fn issue(&self, identity: &Identity, token_type: TokenType) -> Result<String, TokenError> {
        let claims = ClaimSet::issue(identity, token_type, self.lifetime(token_type));
        let token = self.codec.encode(&claims)?;

        tracing::debug!(
            subject = %claims.subject,
            id = %claims.id,
            token_type = %token_type,
            exp = claims.exp,
            "Issued token"
        );

        Ok(token)
    }

    fn parse(&self, token: &str, expected: TokenType) -> Result<Identity, TokenError> {
        let claims = self.codec.decode(token)?;

        if claims.token_type != expected {
            return Err(TokenError::TypeMismatch {
                expected,
                found: claims.token_type,
            });
        }

        let identity = claims.into_identity()?;
        tracing::debug!(
            subject = %identity.subject(),
            id = %identity.id(),
            token_type = %expected,
            "Parsed token"
        );

        Ok(identity)
    }
}

fn to_lifetime(lifetime: std::time::Duration) -> Duration {
    Duration::try_from(lifetime).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration as StdDuration;

    use base64::{Engine, engine::general_purpose::STANDARD};

    use super::*;

    fn secret(fill: u8) -> String {
        STANDARD.encode([fill; 32])
    }

    fn create_test_service() -> TokenService {
        TokenService::new(TokenConfig::new(secret(1))).unwrap()
    }

    fn user(service: &TokenService) -> Identity {
        service
            .create("alice", "ROLE_USER", Uuid::new_v4(), TokenType::Access)
            .unwrap()
    }

    /// Replaces one character in the middle of the signature segment.
    fn tamper_signature(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let mut chars: Vec<char> = signature.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        format!("{head}.{}", chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = create_test_service();
        let identity = user(&service);

        let token = service.generate_access_token(&identity).unwrap();
        let parsed = service.parse_access_token(&token).unwrap();

        assert_eq!(parsed.subject(), "alice");
        assert_eq!(parsed.role(), "ROLE_USER");
        assert_eq!(parsed.id(), identity.id());
        assert_eq!(parsed.token_type(), TokenType::Access);
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let service = create_test_service();
        let identity = user(&service);

        let token = service.generate_refresh_token(&identity).unwrap();
        let parsed = service.parse_refresh_token(&token).unwrap();

        assert_eq!(parsed.subject(), identity.subject());
        assert_eq!(parsed.id(), identity.id());
        assert_eq!(parsed.token_type(), TokenType::Refresh);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = create_test_service();
        let token = service.generate_refresh_token(&user(&service)).unwrap();

        assert_eq!(
            service.parse_access_token(&token).unwrap_err(),
            TokenError::TypeMismatch {
                expected: TokenType::Access,
                found: TokenType::Refresh,
            }
        );
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let token = service.generate_access_token(&user(&service)).unwrap();

        assert_eq!(
            service.parse_refresh_token(&token).unwrap_err(),
            TokenError::TypeMismatch {
                expected: TokenType::Refresh,
                found: TokenType::Access,
            }
        );
    }

    #[test]
    fn test_zero_lifetime_token_is_expired() {
        let config = TokenConfig::new(secret(1))
            .with_access_token_lifetime(StdDuration::ZERO)
            .with_refresh_token_lifetime(StdDuration::ZERO);
        let service = TokenService::new(config).unwrap();
        let identity = user(&service);

        let access = service.generate_access_token(&identity).unwrap();
        assert_eq!(
            service.parse_access_token(&access).unwrap_err(),
            TokenError::Expired
        );

        let refresh = service.generate_refresh_token(&identity).unwrap();
        assert_eq!(
            service.parse_refresh_token(&refresh).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let service = create_test_service();
        let token = service.generate_access_token(&user(&service)).unwrap();

        let err = service
            .parse_access_token(&tamper_signature(&token))
            .unwrap_err();
        assert!(matches!(err, TokenError::Unsupported { .. }));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = TokenService::new(TokenConfig::new(secret(1))).unwrap();
        let verifier = TokenService::new(TokenConfig::new(secret(2))).unwrap();

        let token = issuer.generate_access_token(&user(&issuer)).unwrap();
        let err = verifier.parse_access_token(&token).unwrap_err();
        assert!(matches!(err, TokenError::Unsupported { .. }));
    }

    #[test]
    fn test_service_token() {
        let service = create_test_service();
        let token = service.generate_service_token().unwrap();
        let identity = service.parse_access_token(&token).unwrap();

        assert_eq!(identity.subject(), "SERVICE");
        assert_eq!(identity.role(), ROLE_SERVICE);
        assert_eq!(identity.token_type(), TokenType::Access);
        assert!(identity.is_service());
    }

    #[test]
    fn test_service_token_ids_are_fresh() {
        let service = create_test_service();
        let first = service
            .parse_access_token(&service.generate_service_token().unwrap())
            .unwrap();
        let second = service
            .parse_access_token(&service.generate_service_token().unwrap())
            .unwrap();

        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_service_token_uses_configured_name() {
        let service =
            TokenService::new(TokenConfig::new(secret(1)).with_service_name("billing")).unwrap();
        let identity = service
            .parse_access_token(&service.generate_service_token().unwrap())
            .unwrap();

        assert_eq!(identity.subject(), "billing");
    }

    #[test]
    fn test_service_token_with_empty_name() {
        let service = TokenService::new(TokenConfig::new(secret(1)).with_service_name("")).unwrap();
        assert!(matches!(
            service.generate_service_token().unwrap_err(),
            TokenError::Validation { .. }
        ));
    }

    #[test]
    fn test_create_validation() {
        let service = create_test_service();

        let err = service
            .create("", "ROLE_USER", Uuid::new_v4(), TokenType::Access)
            .unwrap_err();
        assert!(matches!(err, TokenError::Validation { .. }));

        let err = service
            .create("user", "", Uuid::new_v4(), TokenType::Access)
            .unwrap_err();
        assert!(matches!(err, TokenError::Validation { .. }));
    }

    #[test]
    fn test_independent_derivations_interoperate() {
        let first = TokenService::new(TokenConfig::new(secret(3))).unwrap();
        let second = TokenService::new(TokenConfig::new(secret(3))).unwrap();

        let token = first.generate_access_token(&user(&first)).unwrap();
        assert!(second.parse_access_token(&token).is_ok());
    }

    #[test]
    fn test_with_key_ignores_config_secret() {
        let key = SigningKey::derive(&secret(4)).unwrap();
        let service = TokenService::with_key(key, TokenConfig::default());
        let token = service.generate_access_token(&user(&service)).unwrap();

        let derived = TokenService::new(TokenConfig::new(secret(4))).unwrap();
        assert!(derived.parse_access_token(&token).is_ok());
    }

    #[test]
    fn test_invalid_secret_fails_construction() {
        let err = TokenService::new(TokenConfig::new("%%%")).unwrap_err();
        assert!(matches!(err, TokenError::KeyDecoding { .. }));

        let err = TokenService::new(TokenConfig::new(STANDARD.encode([1u8; 16]))).unwrap_err();
        assert!(matches!(err, TokenError::KeyDerivation { .. }));
    }

    #[test]
    fn test_lifetimes_are_applied() {
        let config = TokenConfig::new(secret(1))
            .with_access_token_lifetime(StdDuration::from_secs(60))
            .with_refresh_token_lifetime(StdDuration::from_secs(3600));
        let service = TokenService::new(config).unwrap();
        let identity = user(&service);

        let access = service
            .codec()
            .decode(&service.generate_access_token(&identity).unwrap())
            .unwrap();
        let refresh = service
            .codec()
            .decode(&service.generate_refresh_token(&identity).unwrap())
            .unwrap();

        assert!((3500..=3600).contains(&(refresh.exp - access.exp)));
    }

    #[test]
    fn test_huge_lifetime_does_not_overflow() {
        let config = TokenConfig::new(secret(1)).with_refresh_token_lifetime(StdDuration::MAX);
        let service = TokenService::new(config).unwrap();
        let token = service.generate_refresh_token(&user(&service)).unwrap();

        assert!(service.parse_refresh_token(&token).is_ok());
    }

    #[test]
    fn test_exchange_refresh_token() {
        let service = create_test_service();
        let identity = user(&service);
        let refresh = service.generate_refresh_token(&identity).unwrap();

        let access = service.exchange_refresh_token(&refresh).unwrap();
        let parsed = service.parse_access_token(&access).unwrap();

        assert_eq!(parsed.subject(), identity.subject());
        assert_eq!(parsed.role(), identity.role());
        assert_eq!(parsed.id(), identity.id());
        assert_eq!(parsed.token_type(), TokenType::Access);
    }

    #[test]
    fn test_exchange_rejects_access_token() {
        let service = create_test_service();
        let access = service.generate_access_token(&user(&service)).unwrap();

        assert!(matches!(
            service.exchange_refresh_token(&access).unwrap_err(),
            TokenError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_service_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenService>();
    }
}
