//! Token error types.
//!
//! Every failure the token core can signal is a variant of [`TokenError`].
//! The set is closed, so call sites can match exhaustively instead of
//! inspecting error strings.

use std::fmt;

use crate::token::claims::TokenType;

/// Errors that can occur while deriving keys, issuing or parsing tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The configured secret is empty or not valid base64.
    #[error("Failed to decode signing secret: {message}")]
    KeyDecoding {
        /// Description of the decoding failure.
        message: String,
    },

    /// The decoded secret cannot be turned into a signing key.
    #[error("Unexpected error deriving signing key: {message}")]
    KeyDerivation {
        /// Description of why the key material is unusable.
        message: String,
    },

    /// The token is malformed, its signature does not verify, or its claims
    /// cannot be read.
    #[error("Unsupported token: {message}")]
    Unsupported {
        /// Description of why the token was rejected.
        message: String,
    },

    /// The signature is valid but the token is past its expiry.
    #[error("Token expired")]
    Expired,

    /// The token is valid but of the wrong kind for the operation.
    #[error("Token type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type the consuming operation requires.
        expected: TokenType,
        /// The type carried by the token.
        found: TokenType,
    },

    /// An identity was constructed with an empty subject or role.
    #[error("Invalid identity: {message}")]
    Validation {
        /// Description of the invalid field.
        message: String,
    },

    /// The token could not be serialized or signed.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding failure.
        message: String,
    },
}

impl TokenError {
    /// Creates a new `KeyDecoding` error.
    #[must_use]
    pub fn key_decoding(message: impl Into<String>) -> Self {
        Self::KeyDecoding {
            message: message.into(),
        }
    }

    /// Creates a new `KeyDerivation` error.
    #[must_use]
    pub fn key_derivation(message: impl Into<String>) -> Self {
        Self::KeyDerivation {
            message: message.into(),
        }
    }

    /// Creates a new `Unsupported` error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Returns `true` if the error comes from the signing secret.
    ///
    /// These are deployment defects: retrying will not help until the
    /// configuration is fixed.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::KeyDecoding { .. } | Self::KeyDerivation { .. })
    }

    /// Returns `true` if the presented credential was rejected.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::Unsupported { .. } | Self::Expired | Self::TypeMismatch { .. }
        )
    }

    /// Returns `true` if a client holding a refresh token should use it.
    ///
    /// Only expiry qualifies; a forged or mismatched token must lead to a
    /// fresh authentication.
    #[must_use]
    pub fn should_refresh(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::KeyDecoding { .. } | Self::KeyDerivation { .. } => ErrorCategory::Configuration,
            Self::Unsupported { .. } | Self::Expired | Self::TypeMismatch { .. } => {
                ErrorCategory::Token
            }
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Encoding { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 bearer-token error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::Unsupported { .. }
            | Self::Expired
            | Self::TypeMismatch { .. }
            | Self::Validation { .. } => "invalid_token",
            Self::KeyDecoding { .. } | Self::KeyDerivation { .. } | Self::Encoding { .. } => {
                "server_error"
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::unsupported("signature does not match"),
            ErrorKind::InvalidAlgorithm => {
                Self::unsupported("token is signed with another algorithm")
            }
            ErrorKind::MissingRequiredClaim(claim) => {
                Self::unsupported(format!("missing required claim: {claim}"))
            }
            ErrorKind::Json(e) => Self::unsupported(format!("malformed claims: {e}")),
            _ => Self::unsupported(err.to_string()),
        }
    }
}

/// Categories of token errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Signing secret problems.
    Configuration,
    /// Rejected credentials (invalid, expired, wrong kind).
    Token,
    /// Invalid identity data supplied by the caller.
    Validation,
    /// Unexpected library failures.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
