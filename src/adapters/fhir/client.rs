//! FHIR exchange client
//!
//! Authenticated read/write access to the remote document store. Every call
//! carries a bearer header; a 401 triggers exactly one synchronous
//! credential refresh and one retry of the same call. There is no further
//! retry, backoff, or circuit breaking anywhere in this client.

use super::auth::{KeycloakAuth, TokenFile};
use super::models::SearchBundle;
use super::store::ResourceStore;
use crate::config::{AuthConfig, FhirConfig};
use crate::domain::{BundleEntry, FhirError, ResourceKind, Result};
use async_trait::async_trait;
use reqwest::{ClientBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::RwLock;

/// Client for a SATUSEHAT-compatible FHIR store
///
/// Owns the token lifecycle: the bearer token is loaded from the configured
/// token file at startup (or acquired fresh and persisted), and refreshed in
/// place whenever the store answers 401. Token state is only ever mutated by
/// the refresh path.
#[derive(Debug)]
pub struct FhirClient {
    base_url: String,
    http: reqwest::Client,
    auth: KeycloakAuth,
    token_file: TokenFile,
    token: RwLock<String>,
}

impl FhirClient {
    /// Create a client and ensure it holds a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error when no persisted token exists and the token
    /// exchange fails.
    pub async fn connect(fhir: &FhirConfig, auth_config: &AuthConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(fhir.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !fhir.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let http = client_builder.build().expect("Failed to build HTTP client");

        let auth = KeycloakAuth::new(auth_config);
        let token_file = TokenFile::new(&auth_config.token_file);

        let token = match token_file.load()? {
            Some(token) => token,
            None => {
                let token = auth.request_token(&http).await?;
                token_file.save(&token)?;
                token
            }
        };

        Ok(Self {
            base_url: fhir.base_url.clone(),
            http,
            auth,
            token_file,
            token: RwLock::new(token),
        })
    }

    /// Base collection URL of the store
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Strip the base URL off an absolute `fullUrl`, yielding the relative
    /// reference (`<Type>/<id>`). Unrelated URLs pass through unchanged.
    fn full_url_to_reference<'a>(&self, full_url: &'a str) -> &'a str {
        full_url.strip_prefix(&self.base_url).unwrap_or(full_url)
    }

    /// Exchange credentials, persist the new token, and swap it in.
    async fn refresh_token(&self) -> Result<()> {
        let token = self.auth.request_token(&self.http).await?;
        self.token_file.save(&token)?;
        *self.token.write().await = token;
        Ok(())
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let token = self.token.read().await.clone();
        self.http
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FhirError::ConnectionFailed(e.to_string()).into())
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let token = self.token.read().await.clone();
        self.http
            .post(url)
            .json(body)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FhirError::ConnectionFailed(e.to_string()).into())
    }

    /// GET with the single 401-refresh-retry.
    async fn get_authorized(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let response = self.get(url, query).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.refresh_token().await?;
            return self.get(url, query).await;
        }
        Ok(response)
    }

    /// POST with the single 401-refresh-retry.
    async fn post_authorized(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let response = self.post(url, body).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.refresh_token().await?;
            return self.post(url, body).await;
        }
        Ok(response)
    }
}

#[async_trait]
impl ResourceStore for FhirClient {
    async fn fetch_by_identifier(
        &self,
        kind: ResourceKind,
        identifier: &str,
    ) -> Result<(Option<Value>, String)> {
        let url = format!("{}{}", self.base_url, kind);
        let response = self
            .get_authorized(&url, &[("identifier", identifier)])
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FhirError::UnexpectedStatus { status, body }.into());
        }

        let bundle: SearchBundle = response
            .json()
            .await
            .map_err(|e| FhirError::InvalidResponse(e.to_string()))?;

        match bundle.entry.into_iter().next() {
            Some(entry) => {
                let reference = self.full_url_to_reference(&entry.full_url).to_string();
                Ok((Some(entry.resource), reference))
            }
            None => Ok((None, String::new())),
        }
    }

    async fn fetch_by_reference(&self, reference: &str) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, reference);
        let response = self.get_authorized(&url, &[]).await?;

        if response.status() != StatusCode::OK {
            tracing::debug!(
                reference = reference,
                status = response.status().as_u16(),
                "Reference fetch returned no resource"
            );
            return Ok(None);
        }

        let resource = response
            .json()
            .await
            .map_err(|e| FhirError::InvalidResponse(e.to_string()))?;
        Ok(Some(resource))
    }

    async fn submit_transaction(&self, entries: &[BundleEntry]) -> Result<()> {
        let bundle = json!({
            "resourceType": "Bundle",
            "type": "transaction",
            "entry": serde_json::to_value(entries)?,
        });

        let response = self.post_authorized(&self.base_url, &bundle).await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FhirError::UnexpectedStatus { status, body }.into());
        }

        tracing::info!(entries = entries.len(), "Transaction bundle accepted");
        Ok(())
    }
}
