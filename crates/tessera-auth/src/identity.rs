//! The authenticated principal.
//!
//! [`Identity`] is what callers work with after a token has been parsed:
//! one subject, one role, an id and the token kind it arrived as. Service
//! callers use the same type; [`Identity::is_service`] tells them apart.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::error::TokenError;
use crate::token::claims::{ROLE_SERVICE, TokenType};

/// An authenticated principal derived from a token.
///
/// Construction always goes through [`Identity::new`], so `subject` and
/// `role` are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    subject: String,
    role: String,
    id: Uuid,
    token_type: TokenType,
}

impl Identity {
    /// Creates a new identity.
    ///
    /// # Errors
    /// Returns `TokenError::Validation` if `subject` or `role` is empty.
    pub fn new(
        subject: impl Into<String>,
        role: impl Into<String>,
        id: Uuid,
        token_type: TokenType,
    ) -> Result<Self, TokenError> {
        let subject = subject.into();
        let role = role.into();
        if subject.is_empty() || role.is_empty() {
            return Err(TokenError::validation("subject and role can't be empty"));
        }

        Ok(Self {
            subject,
            role,
            id,
            token_type,
        })
    }

    /// Username, or the service name for service callers.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The single role granted to this principal.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Identifier of the principal.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Kind of token this identity was issued for or parsed from.
    #[must_use]
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Returns `true` for machine-to-machine callers.
    #[must_use]
    pub fn is_service(&self) -> bool {
        self.role == ROLE_SERVICE
    }

    /// Returns the granted authority (the role).
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.role
    }

    /// Returns `true` if the identity holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.subject, self.role)
    }
}
