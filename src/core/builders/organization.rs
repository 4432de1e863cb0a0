//! Organization builder
//!
//! The identifier namespace embeds the organization's own identifier, so the
//! system URI is derived per document rather than fixed.

use super::ORGANIZATION_ANCHOR;
use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{natural_key, BundleEntry, ResourceKind, Result, WriteMethod};
use serde_json::{json, Value};

pub struct OrganizationBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> OrganizationBuilder<'a> {
    pub fn new(store: &'a dyn ResourceStore) -> Self {
        Self {
            store,
            method: WriteMethod::default(),
        }
    }

    pub fn with_method(mut self, method: WriteMethod) -> Self {
        self.method = method;
        self
    }

    /// Pure fragment construction from the derived identifier.
    pub fn fragment(identifier: &str) -> Value {
        json!({
            "resourceType": "Organization",
            "identifier": [{
                "use": "official",
                "system": format!("https://fhir.kemkes.go.id/id/{identifier}"),
                "value": identifier,
            }],
        })
    }

    pub async fn build(&self, organization_id: &str) -> Result<BundleEntry> {
        let identifier = natural_key(organization_id);
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::Organization, &identifier)
            .await?;
        let resource = merge(prior, Self::fragment(&identifier));

        tracing::info!(
            method = self.method.as_str(),
            identifier = %identifier,
            "Staging Organization entry"
        );

        Ok(BundleEntry::new(
            ORGANIZATION_ANCHOR,
            resource,
            self.method,
            ResourceKind::Organization,
            &identifier,
        ))
    }

    pub async fn upsert(&self, organization_id: &str) -> Result<()> {
        let entry = self.build(organization_id).await?;
        self.store.submit_transaction(&[entry]).await
    }
}
