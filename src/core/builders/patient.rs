//! Patient builder
//!
//! The subject of the visit. Its identifier is the EMR number, used as-is.

use super::PATIENT_ANCHOR;
use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{BundleEntry, ResourceKind, Result, WriteMethod};
use serde_json::{json, Value};

pub struct PatientBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> PatientBuilder<'a> {
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

    /// Pure fragment construction; the name block is only present when a
    /// patient name was supplied.
    pub fn fragment(emr_no: &str, patient_name: &str) -> Value {
        let mut resource = json!({
            "resourceType": "Patient",
            "identifier": [{
                "use": "usual",
                "system": "https://fhir.kemkes.go.id/id/ihs-number",
                "value": emr_no,
            }],
        });

        if !patient_name.is_empty() {
            resource["name"] = json!([{
                "use": "official",
                "text": patient_name,
            }]);
        }

        resource
    }

    /// Build the bundle entry, merged onto prior remote state.
    pub async fn build(&self, emr_no: &str, patient_name: &str) -> Result<BundleEntry> {
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::Patient, emr_no)
            .await?;
        let resource = merge(prior, Self::fragment(emr_no, patient_name));

        tracing::info!(
            method = self.method.as_str(),
            identifier = emr_no,
            "Staging Patient entry"
        );

        Ok(BundleEntry::new(
            PATIENT_ANCHOR,
            resource,
            self.method,
            ResourceKind::Patient,
            emr_no,
        ))
    }

    /// Standalone upsert: build and submit as a single-entry transaction.
    pub async fn upsert(&self, emr_no: &str, patient_name: &str) -> Result<()> {
        let entry = self.build(emr_no, patient_name).await?;
        self.store.submit_transaction(&[entry]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_shape() {
        let fragment = PatientBuilder::fragment("PAS20146165", "Siti Rahma");

        assert_eq!(fragment["resourceType"], "Patient");
        assert_eq!(
            fragment["identifier"][0]["system"],
            "https://fhir.kemkes.go.id/id/ihs-number"
        );
        assert_eq!(fragment["identifier"][0]["use"], "usual");
        assert_eq!(fragment["identifier"][0]["value"], "PAS20146165");
        assert_eq!(fragment["name"][0]["use"], "official");
        assert_eq!(fragment["name"][0]["text"], "Siti Rahma");
    }

    #[test]
    fn test_fragment_omits_empty_name() {
        let fragment = PatientBuilder::fragment("PAS20146165", "");
        assert!(fragment.get("name").is_none());
    }
}
