//! Lookup command implementation
//!
//! Resolves one resource from the store, either by `<kind> <identifier>` or
//! by an already-resolved `<Type>/<id>` reference, and prints it as indented
//! JSON. With no arguments it prints usage and exits 0.

use crate::adapters::fhir::{FhirClient, ResourceStore};
use crate::config::load_config;
use crate::domain::ResourceKind;
use anyhow::Context;
use clap::Args;
use serde_json::Value;

/// Arguments for the lookup command
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Resource kind (with an identifier) or a `<Type>/<id>` reference
    pub target: Option<String>,

    /// Business identifier to search for
    pub identifier: Option<String>,
}

impl LookupArgs {
    /// Execute the lookup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(target) = &self.target else {
            println!("Usage: satusehat-bridge lookup <kind> <identifier>");
            println!("       satusehat-bridge lookup <reference>");
            println!();
            println!("Examples:");
            println!("  satusehat-bridge lookup Patient PAS20146165");
            println!("  satusehat-bridge lookup Patient/e2c28481-a56a-45cf-be07-82ab269cef39");
            return Ok(0);
        };

        let config = load_config(config_path)
            .with_context(|| format!("failed to load configuration from {config_path}"))?;
        let client = FhirClient::connect(&config.fhir, &config.auth)
            .await
            .context("failed to connect to the FHIR exchange")?;

        let resource: Value = match &self.identifier {
            Some(identifier) => {
                let kind: ResourceKind = target
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))?;
                let (resource, reference) = client.fetch_by_identifier(kind, identifier).await?;
                if !reference.is_empty() {
                    tracing::debug!(reference = %reference, "Resolved reference");
                }
                resource.unwrap_or_else(|| Value::Object(Default::default()))
            }
            None => client
                .fetch_by_reference(target)
                .await?
                .unwrap_or_else(|| Value::Object(Default::default())),
        };

        println!("{}", serde_json::to_string_pretty(&resource)?);
        Ok(0)
    }
}
