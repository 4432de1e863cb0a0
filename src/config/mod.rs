//! Configuration management.
//!
//! TOML-based configuration with environment variable substitution
//! (`${VAR_NAME}`), `SATUSEHAT_*` environment overrides, and validation on
//! load.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//! dry_run = false
//!
//! [fhir]
//! base_url = "https://fhir.example.id/api/"
//!
//! [auth]
//! keycloak_url = "https://sso.example.id"
//! realm = "satusehat"
//! client_id = "bridge"
//! client_secret = "${SATUSEHAT_CLIENT_SECRET}"
//! token_file = "token.key"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{ApplicationConfig, AuthConfig, BridgeConfig, FhirConfig, LoggingConfig};
pub use secret::{secret_string, SecretString, SecretValue};
