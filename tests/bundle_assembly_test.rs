//! Integration tests for the visit assembler
//!
//! These tests drive the assembler against an in-memory store double,
//! verifying entry ordering, conditional inclusion, placeholder
//! cross-references, and the merge against pre-seeded remote state.

use async_trait::async_trait;
use satusehat_bridge::adapters::fhir::ResourceStore;
use satusehat_bridge::core::assembler::VisitAssembler;
use satusehat_bridge::domain::{BundleEntry, ResourceKind, Result, VisitRecord};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory stand-in for the remote store
#[derive(Default)]
struct InMemoryStore {
    resources: Mutex<HashMap<(ResourceKind, String), Value>>,
    submissions: Mutex<Vec<usize>>,
}

impl InMemoryStore {
    fn seed(&self, kind: ResourceKind, identifier: &str, resource: Value) {
        self.resources
            .lock()
            .unwrap()
            .insert((kind, identifier.to_string()), resource);
    }

    fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn fetch_by_identifier(
        &self,
        kind: ResourceKind,
        identifier: &str,
    ) -> Result<(Option<Value>, String)> {
        let resources = self.resources.lock().unwrap();
        match resources.get(&(kind, identifier.to_string())) {
            Some(resource) => Ok((Some(resource.clone()), format!("{kind}/{identifier}"))),
            None => Ok((None, String::new())),
        }
    }

    async fn fetch_by_reference(&self, _reference: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    async fn submit_transaction(&self, entries: &[BundleEntry]) -> Result<()> {
        self.submissions.lock().unwrap().push(entries.len());
        Ok(())
    }
}

fn minimal_record() -> VisitRecord {
    VisitRecord {
        registration_id: "REG 001".to_string(),
        emr_no: "PAS20146165".to_string(),
        patient_name: "Siti Rahma".to_string(),
        encounter_date: "2024-10-17T08:00:00+07:00".to_string(),
        period_start: "2024-10-17T08:00:00+07:00".to_string(),
        period_end: "2024-10-17T09:00:00+07:00".to_string(),
        ..Default::default()
    }
}

fn kinds(entries: &[BundleEntry]) -> Vec<&str> {
    entries
        .iter()
        .map(|entry| entry.resource["resourceType"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn minimal_record_yields_patient_then_encounter() {
    let store = InMemoryStore::default();
    let entries = VisitAssembler::new(&store)
        .assemble(&minimal_record())
        .await
        .unwrap();

    assert_eq!(kinds(&entries), vec!["Patient", "Encounter"]);
    assert_eq!(entries[0].full_url, "urn:uuid:patient_fullUrl");
    assert_eq!(entries[1].full_url, "urn:uuid:encounter_fullUrl");

    // Without an organization the serviceProvider field is removed
    // structurally, not emptied.
    assert!(entries[1].resource.get("serviceProvider").is_none());
}

#[tokio::test]
async fn empty_allergy_field_yields_no_allergy_entries() {
    let store = InMemoryStore::default();
    let entries = VisitAssembler::new(&store)
        .assemble(&minimal_record())
        .await
        .unwrap();

    assert!(!kinds(&entries).contains(&"AllergyIntolerance"));
}

#[tokio::test]
async fn allergy_tokens_fan_out_with_categories() {
    let store = InMemoryStore::default();
    let mut record = minimal_record();
    record.allergy = "Obat: Amoxicillin|Makanan: Kacang".to_string();

    let entries = VisitAssembler::new(&store).assemble(&record).await.unwrap();
    assert_eq!(
        kinds(&entries),
        vec!["Patient", "AllergyIntolerance", "AllergyIntolerance", "Encounter"]
    );

    let medication = &entries[1];
    assert_eq!(
        medication.resource["identifier"][0]["value"],
        "REG-001-medication"
    );
    assert_eq!(
        medication.request.url,
        "AllergyIntolerance?identifier=REG-001-medication"
    );
    assert_eq!(
        medication.resource["category"][0]["coding"][0]["code"],
        "medication"
    );

    let food = &entries[2];
    assert_eq!(food.resource["identifier"][0]["value"], "REG-001-food");
    assert_eq!(food.resource["category"][0]["coding"][0]["code"], "food");
}

#[tokio::test]
async fn exam_stage_emits_observation_per_measurement() {
    let store = InMemoryStore::default();
    let mut record = minimal_record();
    record.exam_practitioner_id = "N10000001".to_string();
    record.exam_practitioner_name = "dr. Budi".to_string();
    record.exam_date = "2024-10-17T08:30:00+07:00".to_string();
    record.suhu = "36.5".to_string();

    let entries = VisitAssembler::new(&store).assemble(&record).await.unwrap();
    assert_eq!(
        kinds(&entries),
        vec!["Patient", "Practitioner", "Observation", "Encounter"]
    );

    let observation = &entries[2];
    assert_eq!(
        observation.resource["identifier"][0]["value"],
        "REG-001-suhu"
    );
    assert_eq!(observation.request.url, "Observation?identifier=REG-001-suhu");
    assert_eq!(
        observation.resource["code"]["coding"][0]["code"],
        "8310-5"
    );
    assert_eq!(observation.resource["valueQuantity"]["value"], "36.5");
    assert_eq!(
        observation.resource["performer"][0]["reference"],
        "urn:uuid:practitioner_exam_fullUrl"
    );

    // The encounter's reason list points back at the observation anchor
    let encounter = &entries[3];
    assert_eq!(
        encounter.resource["reasonReference"][0]["reference"],
        "urn:uuid:observation_suhu_fullUrl"
    );
}

#[tokio::test]
async fn full_record_ordering_and_cross_references() {
    let store = InMemoryStore::default();
    let record = VisitRecord {
        allergy: "Umum: Debu".to_string(),
        intake_practitioner_id: "N200".to_string(),
        intake_practitioner_name: "Ners Ani".to_string(),
        intake_date: "2024-10-17T08:10:00+07:00".to_string(),
        complaint: "Demam dua hari".to_string(),
        exam_practitioner_id: "N300".to_string(),
        exam_practitioner_name: "dr. Budi".to_string(),
        exam_date: "2024-10-17T08:30:00+07:00".to_string(),
        suhu: "36.5".to_string(),
        sistolik: "120".to_string(),
        diastolik: "80".to_string(),
        location_id: "LOC 01".to_string(),
        location_name: "Poli Umum".to_string(),
        organization_id: "P3205150101".to_string(),
        diagnosis_practitioner_id: "N400".to_string(),
        diagnosis_practitioner_name: "dr. Candra".to_string(),
        diagnosis_date: "2024-10-17T09:00:00+07:00".to_string(),
        icdx_primary: "A09".to_string(),
        icdx_primary_name: "Gastroenteritis".to_string(),
        ..minimal_record()
    };

    let entries = VisitAssembler::new(&store).assemble(&record).await.unwrap();
    assert_eq!(
        kinds(&entries),
        vec![
            "Patient",
            "AllergyIntolerance",
            "Practitioner", // intake
            "Condition",    // intake
            "Practitioner", // exam
            "Observation",  // suhu
            "Observation",  // sistolik
            "Observation",  // diastolik
            "Location",
            "Organization",
            "Encounter",
            "Practitioner", // diagnosis
            "Condition",    // diagnosis
        ]
    );

    // Observations follow the fixed vital-sign order
    assert_eq!(
        entries[5].resource["identifier"][0]["value"],
        "REG-001-suhu"
    );
    assert_eq!(
        entries[6].resource["identifier"][0]["value"],
        "REG-001-sistolik"
    );
    assert_eq!(
        entries[7].resource["identifier"][0]["value"],
        "REG-001-diastolik"
    );

    // Location natural key collapses whitespace
    assert_eq!(entries[8].request.url, "Location?identifier=LOC-01");

    // With an organization present the encounter keeps its serviceProvider
    let encounter = &entries[10];
    assert_eq!(
        encounter.resource["serviceProvider"]["reference"],
        "urn:uuid:organization_fullUrl"
    );
    assert_eq!(
        encounter.resource["location"][0]["location"]["reference"],
        "urn:uuid:location_fullUrl"
    );
    assert_eq!(encounter.resource["diagnosis"]["rank"], 1);

    // Both condition variants address the same natural key
    assert_eq!(entries[3].request.url, "Condition?identifier=REG-001");
    assert_eq!(entries[12].request.url, "Condition?identifier=REG-001");
    // The diagnosis condition carries the ICD-10 coding, intake carries none
    assert_eq!(
        entries[12].resource["code"]["coding"][0]["code"],
        "A09"
    );
    assert_eq!(
        entries[3].resource["code"]["coding"].as_array().unwrap().len(),
        0
    );
    assert_eq!(entries[3].resource["note"]["text"], "Demam dua hari");
}

#[tokio::test]
async fn merge_never_drops_prior_remote_fields() {
    let store = InMemoryStore::default();
    store.seed(
        ResourceKind::Patient,
        "PAS20146165",
        json!({
            "resourceType": "Patient",
            "birthDate": "1988-02-11",
            "identifier": [{
                "use": "old",
                "system": "https://fhir.kemkes.go.id/id/nik",
                "value": "3205..."
            }]
        }),
    );

    let entries = VisitAssembler::new(&store)
        .assemble(&minimal_record())
        .await
        .unwrap();

    let patient = &entries[0].resource;
    // Field present only remotely survives the merge
    assert_eq!(patient["birthDate"], "1988-02-11");
    // The incoming identifier is appended, not replacing the prior one
    let identifiers = patient["identifier"].as_array().unwrap();
    assert_eq!(identifiers.len(), 2);
    assert_eq!(identifiers[0]["system"], "https://fhir.kemkes.go.id/id/nik");
    assert_eq!(
        identifiers[1]["system"],
        "https://fhir.kemkes.go.id/id/ihs-number"
    );
}

#[tokio::test]
async fn reassembly_against_own_output_is_stable() {
    let store = InMemoryStore::default();
    let record = minimal_record();

    let first = VisitAssembler::new(&store).assemble(&record).await.unwrap();

    // Pretend the store now holds exactly what we just built
    store.seed(
        ResourceKind::Patient,
        "PAS20146165",
        first[0].resource.clone(),
    );
    store.seed(ResourceKind::Encounter, "REG-001", first[1].resource.clone());

    let second = VisitAssembler::new(&store).assemble(&record).await.unwrap();
    assert_eq!(
        serde_json::to_value(&first[0]).unwrap(),
        serde_json::to_value(&second[0]).unwrap()
    );
    assert_eq!(
        serde_json::to_value(&first[1]).unwrap(),
        serde_json::to_value(&second[1]).unwrap()
    );
}

#[tokio::test]
async fn dry_run_assembles_without_submitting() {
    let store = InMemoryStore::default();
    let assembler = VisitAssembler::new(&store).with_dry_run(true);
    assembler
        .assemble_and_submit(&minimal_record())
        .await
        .unwrap();

    assert_eq!(store.submission_count(), 0);
}

#[tokio::test]
async fn submit_sends_one_transaction_per_record() {
    let store = InMemoryStore::default();
    let assembler = VisitAssembler::new(&store);
    assembler
        .assemble_and_submit(&minimal_record())
        .await
        .unwrap();

    assert_eq!(store.submission_count(), 1);
    assert_eq!(store.submissions.lock().unwrap()[0], 2);
}
