//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::BridgeConfig;
use super::secret::secret_string;
use crate::domain::errors::BridgeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into `BridgeConfig`
/// 4. Applies environment variable overrides (`SATUSEHAT_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, a
/// referenced environment variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BridgeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BridgeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BridgeConfig = toml::from_str(&contents)
        .map_err(|e| BridgeError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        BridgeError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are passed through untouched. Referencing an unset variable
/// is an error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BridgeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `SATUSEHAT_*` prefix
///
/// Variables follow the pattern `SATUSEHAT_<SECTION>_<KEY>`, for example
/// `SATUSEHAT_FHIR_BASE_URL` or `SATUSEHAT_AUTH_CLIENT_SECRET`.
fn apply_env_overrides(config: &mut BridgeConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("SATUSEHAT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("SATUSEHAT_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SATUSEHAT_APPLICATION_DEBUG") {
        config.application.debug = val.parse().unwrap_or(false);
    }

    // FHIR overrides
    if let Ok(val) = std::env::var("SATUSEHAT_FHIR_BASE_URL") {
        config.fhir.base_url = val;
    }
    if let Ok(val) = std::env::var("SATUSEHAT_FHIR_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.fhir.timeout_seconds = seconds;
        }
    }
    if let Ok(val) = std::env::var("SATUSEHAT_FHIR_TLS_VERIFY") {
        config.fhir.tls_verify = val.parse().unwrap_or(true);
    }

    // Auth overrides
    if let Ok(val) = std::env::var("SATUSEHAT_AUTH_KEYCLOAK_URL") {
        config.auth.keycloak_url = val;
    }
    if let Ok(val) = std::env::var("SATUSEHAT_AUTH_REALM") {
        config.auth.realm = val;
    }
    if let Ok(val) = std::env::var("SATUSEHAT_AUTH_CLIENT_ID") {
        config.auth.client_id = val;
    }
    if let Ok(val) = std::env::var("SATUSEHAT_AUTH_CLIENT_SECRET") {
        config.auth.client_secret = secret_string(val);
    }
    if let Ok(val) = std::env::var("SATUSEHAT_AUTH_TOKEN_FILE") {
        config.auth.token_file = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("SATUSEHAT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("SATUSEHAT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("SATUSEHAT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }
}
