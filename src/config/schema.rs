//! Configuration schema types
//!
//! This module defines the configuration structure for the bridge.

use crate::config::secret::{secret_string, SecretString};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// Main bridge configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote FHIR exchange settings
    pub fhir: FhirConfig,

    /// Keycloak client-credentials settings
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.fhir.validate()?;
        self.auth.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry-run mode: assemble bundles without submitting them
    #[serde(default)]
    pub dry_run: bool,

    /// Debug mode: re-fetch and print every resource after a submit
    #[serde(default)]
    pub debug: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
            debug: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Remote FHIR exchange configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirConfig {
    /// Base collection URL of the store; resource type names are appended
    /// directly, so the URL must end with `/`
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Verify TLS certificates
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl Default for FhirConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/fhir/".to_string(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

impl FhirConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("fhir.base_url must not be empty".to_string());
        }
        if !self.base_url.ends_with('/') {
            return Err("fhir.base_url must end with '/'".to_string());
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("fhir.base_url is not a valid URL: {e}"))?;
        Ok(())
    }
}

/// Keycloak client-credentials configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Keycloak server URL
    pub keycloak_url: String,

    /// Realm name
    pub realm: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret; redacted in Debug output
    pub client_secret: SecretString,

    /// Local file the bearer token is persisted to
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keycloak_url: "http://localhost:8180".to_string(),
            realm: "fhir".to_string(),
            client_id: String::new(),
            client_secret: secret_string(""),
            token_file: default_token_file(),
        }
    }
}

impl AuthConfig {
    fn validate(&self) -> Result<(), String> {
        if self.keycloak_url.is_empty() {
            return Err("auth.keycloak_url must not be empty".to_string());
        }
        if self.realm.is_empty() {
            return Err("auth.realm must not be empty".to_string());
        }
        if self.client_id.is_empty() {
            return Err("auth.client_id must not be empty".to_string());
        }
        if self.client_secret.expose_secret().is_empty() {
            return Err("auth.client_secret must not be empty".to_string());
        }
        if self.token_file.is_empty() {
            return Err("auth.token_file must not be empty".to_string());
        }
        Ok(())
    }

    /// Token endpoint for the client-credentials grant
    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.keycloak_url.trim_end_matches('/'),
            self.realm
        )
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable rolling file logging in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if !["daily", "hourly"].contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid local_rotation '{}'. Must be daily or hourly",
                self.local_rotation
            ));
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_token_file() -> String {
    "token.key".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> BridgeConfig {
        BridgeConfig {
            application: ApplicationConfig::default(),
            fhir: FhirConfig::default(),
            auth: AuthConfig {
                client_id: "bridge-client".to_string(),
                client_secret: secret_string("s3cret"),
                ..Default::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = valid_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_must_end_with_slash() {
        let mut config = valid_config();
        config.fhir.base_url = "http://localhost:8080/fhir".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("end with '/'"));
    }

    #[test]
    fn test_missing_client_secret_rejected() {
        let mut config = valid_config();
        config.auth.client_secret = secret_string("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_url_shape() {
        let auth = AuthConfig {
            keycloak_url: "https://sso.example.id/".to_string(),
            realm: "satusehat".to_string(),
            ..Default::default()
        };
        assert_eq!(
            auth.token_url(),
            "https://sso.example.id/realms/satusehat/protocol/openid-connect/token"
        );
    }

    #[test]
    fn test_invalid_rotation_rejected() {
        let mut config = valid_config();
        config.logging.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
