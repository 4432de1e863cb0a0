//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the bridge configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates on the way in
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  FHIR Base URL: {}", config.fhir.base_url);
        println!("  TLS Verify: {}", config.fhir.tls_verify);
        println!("  Keycloak: {}", config.auth.keycloak_url);
        println!("  Realm: {}", config.auth.realm);
        println!("  Client ID: {}", config.auth.client_id);
        println!("  Token File: {}", config.auth.token_file);
        println!("  File Logging: {}", config.logging.local_enabled);

        Ok(0)
    }
}
