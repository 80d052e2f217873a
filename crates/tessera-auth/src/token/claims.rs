//! Token claims.
//!
//! [`ClaimSet`] is the payload carried inside every token. It is built fresh
//! for each issuance and rebuilt by decoding for each parse; it is never
//! stored.
//!
//! ## Wire names
//!
//! | field | JSON claim |
//! |---|---|
//! | `subject` | `sub` |
//! | `role` | `ROLE` |
//! | `id` | `ID` |
//! | `token_type` | `TOKEN_TYPE` (`ACCESS_TOKEN` / `REFRESH_TOKEN`) |
//! | `exp` | `exp` (Unix seconds) |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::TokenError;
use crate::identity::Identity;

/// Role carried by service-to-service tokens.
pub const ROLE_SERVICE: &str = "ROLE_SERVICE";

// ============================================================================
// Token Type
// ============================================================================

/// Purpose of a token.
///
/// The type decides both the lifetime at issuance and which operations
/// accept the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Short-lived credential for ordinary API calls.
    #[serde(rename = "ACCESS_TOKEN")]
    Access,
    /// Long-lived credential used only to obtain new access tokens.
    #[serde(rename = "REFRESH_TOKEN")]
    Refresh,
}

impl TokenType {
    /// Returns the literal used in the `TOKEN_TYPE` claim.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "ACCESS_TOKEN",
            Self::Refresh => "REFRESH_TOKEN",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCESS_TOKEN" => Ok(Self::Access),
            "REFRESH_TOKEN" => Ok(Self::Refresh),
            other => Err(TokenError::unsupported(format!(
                "unknown token type: {other}"
            ))),
        }
    }
}

// ============================================================================
// Claim Set
// ============================================================================

/// Claims carried by a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Username, or the configured service name for service tokens.
    #[serde(rename = "sub")]
    pub subject: String,

    /// The single role granted by the token.
    #[serde(rename = "ROLE")]
    pub role: String,

    /// Identifier of the principal (user record id or random per service token).
    #[serde(rename = "ID")]
    pub id: Uuid,

    /// Access or refresh.
    #[serde(rename = "TOKEN_TYPE")]
    pub token_type: TokenType,

    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,
}

impl ClaimSet {
    /// Creates a claim set with an explicit expiry.
    ///
    /// # Errors
    /// Returns `TokenError::Validation` if `subject` or `role` is empty.
    pub fn new(
        subject: impl Into<String>,
        role: impl Into<String>,
        id: Uuid,
        token_type: TokenType,
        expires_at: OffsetDateTime,
    ) -> Result<Self, TokenError> {
        let claims = Self {
            subject: subject.into(),
            role: role.into(),
            id,
            token_type,
            exp: expires_at.unix_timestamp(),
        };
        claims.validate().map_err(TokenError::validation)?;
        Ok(claims)
    }

    /// Builds the claims for `identity` as a token of `token_type` that
    /// expires `lifetime` from now.
    #[must_use]
    pub fn issue(identity: &Identity, token_type: TokenType, lifetime: Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            subject: identity.subject().to_string(),
            role: identity.role().to_string(),
            id: identity.id(),
            token_type,
            exp: now.saturating_add(lifetime).unix_timestamp(),
        }
    }

    /// Checks the claim invariants, returning a description of the first
    /// violation.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.subject.is_empty() || self.role.is_empty() {
            return Err("subject and role can't be empty");
        }
        Ok(())
    }

    /// Returns `true` if the claims are expired at `now`.
    ///
    /// A token is valid strictly before its expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() >= self.exp
    }

    /// Returns the expiry as a date-time, if it is representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.exp).ok()
    }

    /// Converts the claims into the identity they describe.
    ///
    /// # Errors
    /// Returns `TokenError::Validation` if `subject` or `role` is empty.
    pub fn into_identity(self) -> Result<Identity, TokenError> {
        Identity::new(self.subject, self.role, self.id, self.token_type)
    }
}
