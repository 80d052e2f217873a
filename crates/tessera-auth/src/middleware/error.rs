//! Error response handling for authentication middleware.
//!
//! [`AuthRejection`] is what the extractors fail with. It implements
//! `IntoResponse` with an OAuth 2.0 bearer-token style body
//! (`{"error": ..., "error_description": ...}`) and, for 401 responses, a
//! `WWW-Authenticate` challenge.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{ErrorCategory, TokenError};

/// Realm advertised in `WWW-Authenticate` challenges.
pub const REALM: &str = "tessera";

/// Rejection produced by the authentication extractors and guards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    /// No bearer credential was presented.
    #[error("Missing bearer credentials")]
    MissingCredentials,

    /// The caller is authenticated but not allowed to perform the request.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Why access was denied.
        message: String,
    },

    /// The presented token was rejected.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AuthRejection {
    /// Creates a new `Forbidden` rejection.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Returns the HTTP status this rejection maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Token(err) => match err.category() {
                ErrorCategory::Token | ErrorCategory::Validation => StatusCode::UNAUTHORIZED,
                ErrorCategory::Configuration | ErrorCategory::Internal => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (oauth_error, message) = error_details(&self);

        if status.is_server_error() {
            tracing::error!(error = %self, "Authentication failed with a server-side error");
        }

        let body = json!({
            "error": oauth_error,
            "error_description": message,
        });

        let mut headers = HeaderMap::new();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = match self {
                Self::MissingCredentials => format!("Bearer realm=\"{REALM}\""),
                _ => build_www_authenticate_header(oauth_error, &message),
            };
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        }

        (status, headers, Json(body)).into_response()
    }
}

/// Returns (OAuth error code, description) for a rejection.
///
/// Server-side failures and undecodable tokens get a fixed description; the
/// underlying detail only goes to the debug log.
fn error_details(rejection: &AuthRejection) -> (&'static str, String) {
    match rejection {
        AuthRejection::MissingCredentials => {
            ("invalid_request", "Missing bearer credentials".to_string())
        }
        AuthRejection::Forbidden { message } => ("insufficient_scope", message.clone()),
        AuthRejection::Token(err) if err.is_configuration_error() => (
            err.oauth_error_code(),
            "Authentication is not available".to_string(),
        ),
        AuthRejection::Token(TokenError::Encoding { .. }) => {
            ("server_error", "Internal server error".to_string())
        }
        AuthRejection::Token(err @ TokenError::Unsupported { .. }) => {
            (err.oauth_error_code(), "The token is invalid".to_string())
        }
        AuthRejection::Token(err) => (err.oauth_error_code(), err.to_string()),
    }
}

/// Builds the WWW-Authenticate header value for 401 responses.
///
/// Format: `Bearer realm="tessera", error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!(
        "Bearer realm=\"{}\", error=\"{}\", error_description=\"{}\"",
        REALM, error, escaped_desc
    )
}

// =============================================================================
// Tests
// =============================================================================
