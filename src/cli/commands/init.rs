//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "satusehat.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export SATUSEHAT_CLIENT_SECRET with your client secret");
                println!("  3. Run: satusehat-bridge validate-config");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to create configuration file: {e}");
                Ok(2)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# satusehat-bridge configuration

[application]
# trace, debug, info, warn, error
log_level = "info"
# Assemble bundles without submitting them
dry_run = false
# Re-fetch and print every written resource after each submit
debug = false

[fhir]
# Base collection URL of the FHIR store; must end with '/'
base_url = "https://fhir.example.id/api/"
timeout_seconds = 30
tls_verify = true

[auth]
keycloak_url = "https://sso.example.id"
realm = "satusehat"
client_id = "satusehat-bridge"
client_secret = "${SATUSEHAT_CLIENT_SECRET}"
# Bearer token is persisted here between runs
token_file = "token.key"

[logging]
local_enabled = false
local_path = "logs"
# daily or hourly
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("satusehat.toml");
        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };

        let code = args.execute().await.unwrap();
        assert_eq!(code, 0);
        assert!(output.exists());

        let contents = fs::read_to_string(&output).unwrap();
        assert!(contents.contains("[fhir]"));
        assert!(contents.contains("[auth]"));
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("satusehat.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };

        let code = args.execute().await.unwrap();
        assert_eq!(code, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }
}
