//! Condition builder
//!
//! A visit produces up to two Condition documents sharing the same resource
//! kind and natural key: the intake complaint and the encounter diagnosis.
//! The variant decides the category coding, whether ICD-10 codings are
//! attached, and whether the recording practitioner is attributed.

use super::{practitioner::StaffRole, CONDITION_ANCHOR, ENCOUNTER_ANCHOR, PATIENT_ANCHOR};
use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{natural_key, BundleEntry, ResourceKind, Result, WriteMethod};
use serde_json::{json, Value};

const CONDITION_CATEGORY: &str = "http://terminology.hl7.org/CodeSystem/condition-category";
const ICD10: &str = "http://hl7.org/fhir/sid/icd-10";

/// The two logical Condition variants of a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionRole {
    /// Intake complaint (anamnesis)
    Intake,
    /// Encounter diagnosis
    Diagnosis,
}

impl ConditionRole {
    /// The staff role whose Practitioner entry this condition references
    pub fn staff(&self) -> StaffRole {
        match self {
            ConditionRole::Intake => StaffRole::Intake,
            ConditionRole::Diagnosis => StaffRole::Diagnosis,
        }
    }

    fn category(&self) -> (&'static str, &'static str) {
        match self {
            ConditionRole::Intake => ("problem-list-item", "Problem List Item"),
            ConditionRole::Diagnosis => ("encounter-diagnosis", "Encounter Diagnosis"),
        }
    }
}

/// Input fields of one Condition fragment
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionFields<'a> {
    pub recorded_at: &'a str,
    pub patient_name: &'a str,
    pub practitioner_name: &'a str,
    /// Free-text complaint; populated for the intake variant
    pub complaint: &'a str,
    /// ICD-10 codes; populated for the diagnosis variant
    pub primary_code: &'a str,
    pub primary_name: &'a str,
    pub secondary_code: &'a str,
    pub secondary_name: &'a str,
}

pub struct ConditionBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> ConditionBuilder<'a> {
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
    pub fn fragment(role: ConditionRole, identifier: &str, fields: &ConditionFields) -> Value {
        let (category_code, category_display) = role.category();

        let mut codings = Vec::new();
        if role == ConditionRole::Diagnosis {
            if !fields.primary_code.is_empty() {
                codings.push(json!({
                    "system": ICD10,
                    "code": fields.primary_code,
                    "display": fields.primary_name,
                }));
            }
            if !fields.secondary_code.is_empty() {
                codings.push(json!({
                    "system": ICD10,
                    "code": fields.secondary_code,
                    "display": fields.secondary_name,
                }));
            }
        }

        let role_reference = json!({
            "reference": role.staff().anchor(),
            "type": "Practitioner",
            "display": fields.practitioner_name,
        });

        let mut participants = vec![role_reference.clone()];
        let recorder = if role == ConditionRole::Diagnosis {
            participants.push(role_reference.clone());
            role_reference
        } else {
            json!({})
        };

        json!({
            "resourceType": "Condition",
            "identifier": [{
                "use": "official",
                "system": "https://sys-ids.kemkes.go.id/condition",
                "value": identifier,
            }],
            "status": "active",
            "clinicalStatus": {
                "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "code": "active",
                "display": "Active",
            },
            "category": [{
                "coding": [{
                    "system": CONDITION_CATEGORY,
                    "code": category_code,
                    "display": category_display,
                }]
            }],
            "code": {
                "coding": codings,
            },
            "subject": {
                "reference": PATIENT_ANCHOR,
                "type": "Patient",
                "display": fields.patient_name,
            },
            "recorder": recorder,
            "participant": participants,
            "encounter": {
                "reference": ENCOUNTER_ANCHOR,
                "type": "Encounter",
            },
            "recordedDate": fields.recorded_at,
            "note": {
                "text": fields.complaint,
            },
        })
    }

    /// Build the bundle entry for one variant, merged onto prior state.
    pub async fn build(
        &self,
        role: ConditionRole,
        registration_id: &str,
        fields: &ConditionFields<'_>,
    ) -> Result<BundleEntry> {
        let identifier = natural_key(registration_id);
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::Condition, &identifier)
            .await?;
        let resource = merge(prior, Self::fragment(role, &identifier, fields));

        tracing::info!(
            method = self.method.as_str(),
            identifier = %identifier,
            role = role.staff().as_str(),
            "Staging Condition entry"
        );

        Ok(BundleEntry::new(
            CONDITION_ANCHOR,
            resource,
            self.method,
            ResourceKind::Condition,
            &identifier,
        ))
    }

    pub async fn upsert(
        &self,
        role: ConditionRole,
        registration_id: &str,
        fields: &ConditionFields<'_>,
    ) -> Result<()> {
        let entry = self.build(role, registration_id, fields).await?;
        self.store.submit_transaction(&[entry]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intake_fragment() {
        let fields = ConditionFields {
            recorded_at: "2024-10-17T08:00:00+07:00",
            patient_name: "Siti",
            practitioner_name: "Ners Ani",
            complaint: "Demam dua hari",
            ..Default::default()
        };
        let fragment = ConditionBuilder::fragment(ConditionRole::Intake, "REG-1", &fields);

        assert_eq!(
            fragment["category"][0]["coding"][0]["code"],
            "problem-list-item"
        );
        assert_eq!(fragment["note"]["text"], "Demam dua hari");
        assert_eq!(fragment["code"]["coding"].as_array().unwrap().len(), 0);
        // Intake leaves the recorder unattributed
        assert_eq!(fragment["recorder"], serde_json::json!({}));
        assert_eq!(
            fragment["participant"][0]["reference"],
            "urn:uuid:practitioner_intake_fullUrl"
        );
        assert_eq!(fragment["participant"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_diagnosis_fragment_with_two_codes() {
        let fields = ConditionFields {
            recorded_at: "2024-10-17T10:00:00+07:00",
            patient_name: "Siti",
            practitioner_name: "dr. Budi",
            primary_code: "A09",
            primary_name: "Diarrhoea and gastroenteritis",
            secondary_code: "R50.9",
            secondary_name: "Fever, unspecified",
            ..Default::default()
        };
        let fragment = ConditionBuilder::fragment(ConditionRole::Diagnosis, "REG-1", &fields);

        assert_eq!(
            fragment["category"][0]["coding"][0]["code"],
            "encounter-diagnosis"
        );

        let codings = fragment["code"]["coding"].as_array().unwrap();
        assert_eq!(codings.len(), 2);
        assert_eq!(codings[0]["code"], "A09");
        assert_eq!(codings[0]["system"], "http://hl7.org/fhir/sid/icd-10");
        assert_eq!(codings[1]["code"], "R50.9");

        assert_eq!(
            fragment["recorder"]["reference"],
            "urn:uuid:practitioner_diagnosis_fullUrl"
        );
        assert_eq!(fragment["recorder"]["display"], "dr. Budi");
        // Diagnosis variant adds the recorder as a second participant
        assert_eq!(fragment["participant"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_diagnosis_fragment_without_codes() {
        let fields = ConditionFields {
            practitioner_name: "dr. Budi",
            ..Default::default()
        };
        let fragment = ConditionBuilder::fragment(ConditionRole::Diagnosis, "REG-1", &fields);

        assert_eq!(fragment["code"]["coding"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_both_variants_share_identifier() {
        let fields = ConditionFields::default();
        let intake = ConditionBuilder::fragment(ConditionRole::Intake, "REG-1", &fields);
        let diagnosis = ConditionBuilder::fragment(ConditionRole::Diagnosis, "REG-1", &fields);

        assert_eq!(intake["identifier"], diagnosis["identifier"]);
    }
}
