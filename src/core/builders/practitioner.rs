//! Practitioner builder
//!
//! One visit can involve up to three staff members in distinct roles. All
//! share the Practitioner resource kind; the role only selects the
//! batch-local anchor so sibling entries can point at the right person.

use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{BundleEntry, ResourceKind, Result, WriteMethod};
use serde_json::{json, Value};
use std::fmt;

/// Staff role within a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    /// Anamnesis / intake interview
    Intake,
    /// Physical examination
    Exam,
    /// Diagnosis
    Diagnosis,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Intake => "intake",
            StaffRole::Exam => "exam",
            StaffRole::Diagnosis => "diagnosis",
        }
    }

    /// Batch-local anchor of this role's Practitioner entry
    pub fn anchor(&self) -> String {
        format!("urn:uuid:practitioner_{}_fullUrl", self.as_str())
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct PractitionerBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> PractitionerBuilder<'a> {
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
    /// practitioner name was supplied.
    pub fn fragment(practitioner_id: &str, practitioner_name: &str) -> Value {
        let mut resource = json!({
            "resourceType": "Practitioner",
            "identifier": [{
                "use": "usual",
                "system": "https://fhir.kemkes.go.id/id/nakes-his-number",
                "value": practitioner_id,
            }],
        });

        if !practitioner_name.is_empty() {
            resource["name"] = json!([{
                "use": "official",
                "text": practitioner_name,
            }]);
        }

        resource
    }

    /// Build the bundle entry for one staff role, merged onto prior state.
    /// The practitioner id is used as-is as the natural key.
    pub async fn build(
        &self,
        role: StaffRole,
        practitioner_id: &str,
        practitioner_name: &str,
    ) -> Result<BundleEntry> {
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::Practitioner, practitioner_id)
            .await?;
        let resource = merge(prior, Self::fragment(practitioner_id, practitioner_name));

        tracing::info!(
            method = self.method.as_str(),
            identifier = practitioner_id,
            role = role.as_str(),
            "Staging Practitioner entry"
        );

        Ok(BundleEntry::new(
            role.anchor(),
            resource,
            self.method,
            ResourceKind::Practitioner,
            practitioner_id,
        ))
    }

    /// Standalone upsert: build and submit as a single-entry transaction.
    pub async fn upsert(
        &self,
        role: StaffRole,
        practitioner_id: &str,
        practitioner_name: &str,
    ) -> Result<()> {
        let entry = self.build(role, practitioner_id, practitioner_name).await?;
        self.store.submit_transaction(&[entry]).await
    }
}
