//! Bearer-token lifecycle
//!
//! The bridge authenticates with a bearer token obtained from Keycloak via
//! the client-credentials grant. The current token is persisted to a local
//! file so restarts reuse it until the store answers 401.

use super::models::TokenResponse;
use crate::config::{AuthConfig, SecretString};
use crate::domain::{FhirError, Result};
use secrecy::ExposeSecret;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted bearer token
///
/// The file holds the token on the first non-comment line; `#` lines are
/// ignored so the file can carry provenance notes.
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted token, if the file exists and holds one.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Ok(Some(line.to_string()));
        }

        Ok(None)
    }

    /// Persist a freshly acquired token, replacing any previous one.
    pub fn save(&self, token: &str) -> Result<()> {
        fs::write(&self.path, token)?;
        Ok(())
    }
}

/// Keycloak client-credentials exchange
#[derive(Debug, Clone)]
pub struct KeycloakAuth {
    token_url: String,
    client_id: String,
    client_secret: SecretString,
}

impl KeycloakAuth {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Exchange client credentials for a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::TokenExchangeFailed`] when the endpoint is
    /// unreachable or answers with a non-success status.
    pub async fn request_token(&self, http: &reqwest::Client) -> Result<String> {
        tracing::info!(token_url = %self.token_url, "Requesting new bearer token");

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_ref()),
            ("grant_type", "client_credentials"),
        ];

        let response = http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| FhirError::TokenExchangeFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(
                FhirError::TokenExchangeFailed(format!("status {status}: {body}")).into(),
            );
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FhirError::TokenExchangeFailed(e.to_string()))?;

        Ok(token.access_token)
    }
}
