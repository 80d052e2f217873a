//! Bearer token authentication extractors.
//!
//! The extractors read `Authorization: Bearer <token>`, parse it as an access
//! token and hand the resulting [`Identity`] to the handler. Nothing is stored
//! in request extensions or global state; a handler that needs the caller
//! asks for it in its signature.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use tessera_auth::middleware::{AuthState, BearerIdentity};
//!
//! async fn protected_handler(BearerIdentity(identity): BearerIdentity) -> String {
//!     format!("Hello, {}!", identity.subject())
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(AuthState::new(token_service));
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::TokenError;
use crate::identity::Identity;
use crate::token::TokenService;

use super::error::AuthRejection;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token authentication.
///
/// Include it in your application state and make it available to the
/// extractors via `FromRef`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct AppState {
///     auth: AuthState,
///     // ... other state
/// }
///
/// impl FromRef<AppState> for AuthState {
///     fn from_ref(state: &AppState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Token service used to parse access tokens.
    pub token_service: Arc<TokenService>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self { token_service }
    }
}

impl From<TokenService> for AuthState {
    fn from(token_service: TokenService) -> Self {
        Self::new(Arc::new(token_service))
    }
}

// =============================================================================
// Header Handling
// =============================================================================

/// Returns the bearer credential from the `Authorization` header.
///
/// A missing header, a non-Bearer scheme, a non-ASCII value and an empty
/// credential all yield `None`.
#[must_use]
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller identity from request headers.
///
/// Returns `Ok(None)` when no bearer credential is present; otherwise the
/// credential is parsed as an access token.
///
/// # Errors
/// Any error from [`TokenService::parse_access_token`].
pub fn resolve_bearer(
    headers: &HeaderMap,
    token_service: &TokenService,
) -> Result<Option<Identity>, TokenError> {
    match extract_bearer(headers) {
        Some(token) => token_service.parse_access_token(token).map(Some),
        None => Ok(None),
    }
}

// =============================================================================
// Bearer Identity Extractor
// =============================================================================

/// Axum extractor that requires a valid access token.
///
/// # Errors
///
/// Rejects with [`AuthRejection`] if:
/// - no bearer credential is present (401)
/// - the token is invalid, expired or a refresh token (401)
///
/// # Example
///
/// ```ignore
/// async fn handler(BearerIdentity(identity): BearerIdentity) -> impl IntoResponse {
///     if identity.has_role("ROLE_ADMIN") {
///         // Allow access
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BearerIdentity(pub Identity);

impl<S> FromRequestParts<S> for BearerIdentity
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        match resolve_bearer(&parts.headers, &auth_state.token_service) {
            Ok(Some(identity)) => Ok(BearerIdentity(identity)),
            Ok(None) => Err(AuthRejection::MissingCredentials),
            Err(e) => {
                tracing::debug!(error = %e, category = %e.category(), "Rejected bearer token");
                Err(e.into())
            }
        }
    }
}

// =============================================================================
// Optional Bearer Identity Extractor
// =============================================================================

/// Axum extractor that authenticates when it can and never rejects.
///
/// An absent header, a non-Bearer scheme and a rejected token all produce
/// `None`, so the request proceeds unauthenticated.
///
/// # Example
///
/// ```ignore
/// async fn handler(OptionalBearerIdentity(identity): OptionalBearerIdentity) -> String {
///     match identity {
///         Some(identity) => format!("Hello, {}!", identity.subject()),
///         None => "Hello, anonymous!".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct OptionalBearerIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalBearerIdentity
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let identity = match resolve_bearer(&parts.headers, &auth_state.token_service) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring rejected bearer token");
                None
            }
        };

        Ok(OptionalBearerIdentity(identity))
    }
}

// =============================================================================
// Guards
// =============================================================================

/// Requires a service (machine-to-machine) caller.
///
/// # Errors
/// Returns `AuthRejection::Forbidden` if the identity is not a service.
pub fn require_service(identity: &Identity) -> Result<(), AuthRejection> {
    if identity.is_service() {
        Ok(())
    } else {
        Err(AuthRejection::forbidden("Service credentials required"))
    }
}

/// Requires the identity to hold `role`.
///
/// # Errors
/// Returns `AuthRejection::Forbidden` if the role does not match.
pub fn require_role(identity: &Identity, role: &str) -> Result<(), AuthRejection> {
    if identity.has_role(role) {
        Ok(())
    } else {
        Err(AuthRejection::forbidden(format!("Role {role} required")))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use base64::{Engine, engine::general_purpose::STANDARD};
    use uuid::Uuid;

    use super::*;
    use crate::config::TokenConfig;
    use crate::token::{ROLE_SERVICE, TokenType};

    fn create_test_service() -> TokenService {
        TokenService::new(TokenConfig::new(STANDARD.encode([9u8; 32]))).unwrap()
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn user() -> Identity {
        Identity::new("alice", "ROLE_USER", Uuid::new_v4(), TokenType::Access).unwrap()
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(
            extract_bearer(&headers_with("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer(&headers_with("bearer abc")), None);
        assert_eq!(extract_bearer(&headers_with("Bearer ")), None);
    }

    #[test]
    fn test_resolve_without_header_is_none() {
        let service = create_test_service();
        assert_eq!(resolve_bearer(&HeaderMap::new(), &service).unwrap(), None);
        assert_eq!(
            resolve_bearer(&headers_with("Basic dXNlcjpwYXNz"), &service).unwrap(),
            None
        );
    }

    #[test]
    fn test_resolve_access_token() {
        let service = create_test_service();
        let identity = user();
        let token = service.generate_access_token(&identity).unwrap();

        let resolved = resolve_bearer(&headers_with(&format!("Bearer {token}")), &service)
            .unwrap()
            .unwrap();
        assert_eq!(resolved, identity);
    }

    #[test]
    fn test_resolve_refresh_token_is_rejected() {
        let service = create_test_service();
        let token = service.generate_refresh_token(&user()).unwrap();

        let err = resolve_bearer(&headers_with(&format!("Bearer {token}")), &service).unwrap_err();
        assert!(matches!(err, TokenError::TypeMismatch { .. }));
    }

    #[test]
    fn test_resolve_garbage_is_rejected() {
        let service = create_test_service();
        let err = resolve_bearer(&headers_with("Bearer garbage"), &service).unwrap_err();
        assert!(matches!(err, TokenError::Unsupported { .. }));
    }

    #[test]
    fn test_require_service() {
        let service =
            Identity::new("SERVICE", ROLE_SERVICE, Uuid::new_v4(), TokenType::Access).unwrap();
        assert!(require_service(&service).is_ok());
        assert!(matches!(
            require_service(&user()).unwrap_err(),
            AuthRejection::Forbidden { .. }
        ));
    }

    #[test]
    fn test_require_role() {
        assert!(require_role(&user(), "ROLE_USER").is_ok());
        assert!(require_role(&user(), "ROLE_ADMIN").is_err());
    }
}
