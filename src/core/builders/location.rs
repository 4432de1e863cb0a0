//! Location builder

use super::LOCATION_ANCHOR;
use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{natural_key, BundleEntry, ResourceKind, Result, WriteMethod};
use serde_json::{json, Value};

pub struct LocationBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> LocationBuilder<'a> {
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
    pub fn fragment(identifier: &str, location_name: &str) -> Value {
        json!({
            "resourceType": "Location",
            "identifier": [{
                "use": "usual",
                "system": "http://sys-ids.kemkes.go.id/location",
                "value": identifier,
            }],
            "name": location_name,
        })
    }

    pub async fn build(&self, location_id: &str, location_name: &str) -> Result<BundleEntry> {
        let identifier = natural_key(location_id);
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::Location, &identifier)
            .await?;
        let resource = merge(prior, Self::fragment(&identifier, location_name));

        tracing::info!(
            method = self.method.as_str(),
            identifier = %identifier,
            "Staging Location entry"
        );

        Ok(BundleEntry::new(
            LOCATION_ANCHOR,
            resource,
            self.method,
            ResourceKind::Location,
            &identifier,
        ))
    }

    pub async fn upsert(&self, location_id: &str, location_name: &str) -> Result<()> {
        let entry = self.build(location_id, location_name).await?;
        self.store.submit_transaction(&[entry]).await
    }
}
