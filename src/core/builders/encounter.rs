//! Encounter builder
//!
//! The hub of the visit: it references the patient, the practitioner, the
//! location and organization (when present), the diagnosis condition, and
//! every written Observation. It is built early by the assembler but
//! appended after the entries it points at.

use super::{
    observation::VitalSign, CONDITION_ANCHOR, LOCATION_ANCHOR, ORGANIZATION_ANCHOR,
    PATIENT_ANCHOR, PRACTITIONER_ANCHOR,
};
use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{natural_key, BundleEntry, ResourceKind, Result, VisitRecord, WriteMethod};
use serde_json::{json, Value};

pub struct EncounterBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> EncounterBuilder<'a> {
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

    /// Pure fragment construction from the derived visit identifier.
    pub fn fragment(identifier: &str, record: &VisitRecord) -> Value {
        json!({
            "resourceType": "Encounter",
            "identifier": [{
                "use": "usual",
                "system": "http://sys-ids.kemkes.go.id/encounter",
                "value": identifier,
            }],
            "period": {
                "start": record.encounter_date,
            },
            "statusHistory": Self::status_history(record),
            "subject": {
                "reference": PATIENT_ANCHOR,
                "type": "Patient",
            },
            "participant": [{
                "actor": {
                    "reference": PRACTITIONER_ANCHOR,
                    "type": "Practitioner",
                },
            }],
            "reasonReference": Self::reason_references(record),
            "location": Self::location_block(record),
            "diagnosis": Self::diagnosis_block(record),
            "actualPeriod": {
                "start": record.period_start,
                "end": record.period_end,
            },
            "serviceProvider": {
                "reference": ORGANIZATION_ANCHOR,
                "type": "Organization",
            },
        })
    }

    /// Status-history decision table.
    ///
    /// Rows are evaluated top to bottom and a later match replaces an
    /// earlier one, so with several period pairs present the bottom-most
    /// present pair decides the block. The first two rows both carry the
    /// arrived timestamps.
    fn status_history(record: &VisitRecord) -> Value {
        let rows: [(bool, &str, &str, &str); 3] = [
            (
                !record.history_inprogress_start.is_empty()
                    || !record.history_inprogress_end.is_empty(),
                "arrived",
                &record.history_arrived_start,
                &record.history_arrived_end,
            ),
            (
                !record.history_arrived_start.is_empty()
                    || !record.history_arrived_end.is_empty(),
                "in-progress",
                &record.history_arrived_start,
                &record.history_arrived_end,
            ),
            (
                !record.history_finished_start.is_empty()
                    || !record.history_finished_end.is_empty(),
                "finished",
                &record.history_finished_start,
                &record.history_finished_end,
            ),
        ];

        let mut block = json!({"status": "", "period": {}});
        for (present, status, start, end) in rows {
            if present {
                block = json!({
                    "status": status,
                    "period": {"start": start, "end": end},
                });
            }
        }
        block
    }

    /// One reference per non-empty vital-sign reading, in the fixed order.
    fn reason_references(record: &VisitRecord) -> Vec<Value> {
        VitalSign::ALL
            .into_iter()
            .filter(|sign| !sign.reading(record).is_empty())
            .map(|sign| {
                json!({
                    "reference": sign.anchor(),
                    "type": "Observation",
                })
            })
            .collect()
    }

    /// The location reference is only filled when a location id is present;
    /// the wrapping list stays either way.
    fn location_block(record: &VisitRecord) -> Value {
        if record.location_id.is_empty() {
            json!([{"location": {}}])
        } else {
            json!([{
                "location": {
                    "reference": LOCATION_ANCHOR,
                    "type": "Location",
                },
            }])
        }
    }

    /// Zero, one, or two condition references; both point at the shared
    /// condition anchor and the rank follows the last one added.
    fn diagnosis_block(record: &VisitRecord) -> Value {
        let mut conditions = Vec::new();
        let mut rank = None;

        if !record.icdx_primary.is_empty() {
            conditions.push(json!({
                "reference": CONDITION_ANCHOR,
                "type": "Condition",
                "display": record.icdx_primary_name,
            }));
            rank = Some(1);
        }
        if !record.icdx_secondary.is_empty() {
            conditions.push(json!({
                "reference": CONDITION_ANCHOR,
                "type": "Condition",
                "display": record.icdx_secondary_name,
            }));
            rank = Some(2);
        }

        let mut block = json!({
            "condition": conditions,
            "use": {
                "coding": [{
                    "system": "https://www.hl7.org/fhir/Codesystem-diagnosis-role",
                    "code": "DD",
                    "display": "Discharge diagnosis",
                }]
            },
        });
        if let Some(rank) = rank {
            block["rank"] = json!(rank);
        }
        block
    }

    /// Build the bundle entry, merged onto prior remote state.
    pub async fn build(&self, record: &VisitRecord) -> Result<BundleEntry> {
        let identifier = natural_key(&record.registration_id);
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::Encounter, &identifier)
            .await?;
        let resource = merge(prior, Self::fragment(&identifier, record));

        tracing::info!(
            method = self.method.as_str(),
            identifier = %identifier,
            "Staging Encounter entry"
        );

        Ok(BundleEntry::new(
            super::ENCOUNTER_ANCHOR,
            resource,
            self.method,
            ResourceKind::Encounter,
            &identifier,
        ))
    }

    pub async fn upsert(&self, record: &VisitRecord) -> Result<()> {
        let entry = self.build(record).await?;
        self.store.submit_transaction(&[entry]).await
    }
}
