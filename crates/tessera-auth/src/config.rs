//! Token service configuration.
//!
//! The configuration surface is deliberately small: the signing secret,
//! two lifetimes and the subject used for service tokens.
//!
//! # Example (TOML)
//!
//! ```toml
//! secret = "c2VjcmV0LXNlY3JldC1zZWNyZXQtc2VjcmV0LXNlY3JldA=="
//! access_token_lifetime = "15m"
//! refresh_token_lifetime = "7d"
//! service_name = "billing"
//! ```

use std::fmt;
use std::time::Duration;

use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`TokenConfig::secret`].
pub const ENV_SECRET: &str = "TESSERA_SECRET";
/// Environment variable overriding [`TokenConfig::access_token_lifetime`].
pub const ENV_ACCESS_TOKEN_LIFETIME: &str = "TESSERA_ACCESS_TOKEN_LIFETIME";
/// Environment variable overriding [`TokenConfig::refresh_token_lifetime`].
pub const ENV_REFRESH_TOKEN_LIFETIME: &str = "TESSERA_REFRESH_TOKEN_LIFETIME";
/// Environment variable overriding [`TokenConfig::service_name`].
pub const ENV_SERVICE_NAME: &str = "TESSERA_SERVICE_NAME";

/// Configuration for issuing and parsing tokens.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Base64-encoded symmetric signing secret (at least 256 bits decoded).
    pub secret: String,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    /// Expected to exceed the access token lifetime; not enforced.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Subject placed in service tokens.
    pub service_name: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_lifetime: Duration::from_secs(15 * 60), // 15 minutes
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
            service_name: "SERVICE".to_string(),
        }
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .field("service_name", &self.service_name)
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl TokenConfig {
    /// Creates a configuration with the given secret and default lifetimes.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets the subject used for service tokens.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Parses a configuration from a TOML document.
    ///
    /// Missing keys keep their defaults.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` if the document is not valid TOML or a
    /// value has the wrong shape.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `TESSERA_*` environment variable overrides.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if a lifetime variable is not a
    /// valid duration (e.g. `15m`, `7d`).
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    /// See [`TokenConfig::apply_env`].
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_SECRET) {
            self.secret = secret;
        }
        if let Some(value) = lookup(ENV_ACCESS_TOKEN_LIFETIME) {
            self.access_token_lifetime = parse_duration(ENV_ACCESS_TOKEN_LIFETIME, &value)?;
        }
        if let Some(value) = lookup(ENV_REFRESH_TOKEN_LIFETIME) {
            self.refresh_token_lifetime = parse_duration(ENV_REFRESH_TOKEN_LIFETIME, &value)?;
        }
        if let Some(name) = lookup(ENV_SERVICE_NAME) {
            self.service_name = name;
        }
        Ok(self)
    }

    /// Validates the configuration.
    ///
    /// A refresh lifetime that does not exceed the access lifetime is
    /// allowed but logged as a warning.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Missing` if the secret is empty
    /// - `ConfigError::InvalidValue` if the service name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::Missing("secret".to_string()));
        }

        if self.service_name.is_empty() {
            return Err(ConfigError::InvalidValue(
                "service_name cannot be empty".to_string(),
            ));
        }

        if self.refresh_token_lifetime <= self.access_token_lifetime {
            tracing::warn!(
                access_token_lifetime = ?self.access_token_lifetime,
                refresh_token_lifetime = ?self.refresh_token_lifetime,
                "Refresh token lifetime does not exceed access token lifetime"
            );
        }

        Ok(())
    }
}

fn parse_duration(name: &str, value: &str) -> Result<Duration, ConfigError> {
    let deserializer: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        value.trim().into_deserializer();
    humantime_serde::deserialize(deserializer)
        .map_err(|e| ConfigError::InvalidValue(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = TokenConfig::default();
        assert!(config.secret.is_empty());
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.refresh_token_lifetime, Duration::from_secs(604_800));
        assert_eq!(config.service_name, "SERVICE");
    }

    #[test]
    fn test_empty_secret_fails_validation() {
        let err = TokenConfig::default().validate().unwrap_err();
        assert_eq!(err, ConfigError::Missing("secret".to_string()));
    }

    #[test]
    fn test_empty_service_name_fails_validation() {
        let err = TokenConfig::new("c2VjcmV0")
            .with_service_name("")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_short_refresh_lifetime_is_allowed() {
        let config = TokenConfig::new("c2VjcmV0")
            .with_access_token_lifetime(Duration::from_secs(3600))
            .with_refresh_token_lifetime(Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = TokenConfig::from_toml_str(
            r#"
            secret = "c2VjcmV0"
            access_token_lifetime = "5m"
            refresh_token_lifetime = "30days"
            service_name = "billing"
            "#,
        )
        .unwrap();

        assert_eq!(config.secret, "c2VjcmV0");
        assert_eq!(config.access_token_lifetime, Duration::from_secs(300));
        assert_eq!(
            config.refresh_token_lifetime,
            Duration::from_secs(30 * 86_400)
        );
        assert_eq!(config.service_name, "billing");
    }

    #[test]
    fn test_from_toml_keeps_defaults() {
        let config = TokenConfig::from_toml_str(r#"secret = "c2VjcmV0""#).unwrap();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.service_name, "SERVICE");
    }

    #[test]
    fn test_from_toml_rejects_bad_duration() {
        let err = TokenConfig::from_toml_str(r#"access_token_lifetime = "soon""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_SECRET, "b3ZlcnJpZGRlbg=="),
            (ENV_ACCESS_TOKEN_LIFETIME, "1h"),
            (ENV_SERVICE_NAME, "orders"),
        ]);

        let config = TokenConfig::new("c2VjcmV0")
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.secret, "b3ZlcnJpZGRlbg==");
        assert_eq!(config.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(config.refresh_token_lifetime, Duration::from_secs(604_800));
        assert_eq!(config.service_name, "orders");
    }

    #[test]
    fn test_override_with_bad_duration() {
        let err = TokenConfig::default()
            .apply_overrides(|name| {
                (name == ENV_REFRESH_TOKEN_LIFETIME).then(|| "forever".to_string())
            })
            .unwrap_err();
        let ConfigError::InvalidValue(msg) = &err else {
            panic!("expected InvalidValue, got {err:?}");
        };
        assert!(msg.starts_with(ENV_REFRESH_TOKEN_LIFETIME));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", TokenConfig::new("c3VwZXItc2VjcmV0"));
        assert!(!debug.contains("c3VwZXItc2VjcmV0"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue("test error".to_string());
        assert_eq!(err.to_string(), "Invalid configuration value: test error");

        let err = ConfigError::Missing("secret".to_string());
        assert_eq!(err.to_string(), "Missing required configuration: secret");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = TokenConfig::new("c2VjcmV0").with_service_name("billing");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: TokenConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.secret, parsed.secret);
        assert_eq!(config.access_token_lifetime, parsed.access_token_lifetime);
        assert_eq!(config.service_name, parsed.service_name);
    }
}
