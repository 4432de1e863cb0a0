//! Visit assembler
//!
//! Orchestrates the builders for one visit record into an ordered batch of
//! bundle entries and, unless dry-run, submits the batch as one atomic
//! transaction. The assembler is stateless across calls; everything it
//! produces derives from the input record and the store's current remote
//! state.

use super::builders::{
    parse_allergy, AllergyBuilder, ConditionBuilder, ConditionFields, ConditionRole,
    EncounterBuilder, LocationBuilder, ObservationBuilder, OrganizationBuilder, PatientBuilder,
    PractitionerBuilder, StaffRole, VitalReadings, VitalSign,
};
use crate::adapters::fhir::ResourceStore;
use crate::domain::{natural_key, BundleEntry, ResourceKind, Result, VisitRecord};

/// Assembles one visit record into a transaction bundle
pub struct VisitAssembler<'a> {
    store: &'a dyn ResourceStore,
    dry_run: bool,
    debug: bool,
}

impl<'a> VisitAssembler<'a> {
    pub fn new(store: &'a dyn ResourceStore) -> Self {
        Self {
            store,
            dry_run: false,
            debug: false,
        }
    }

    /// Assemble without submitting.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// After submitting, re-fetch and print every written resource.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Assemble the ordered batch for one record.
    ///
    /// The patient always leads. The encounter is built second (its merge
    /// against prior state happens before any other visit-scoped entry)
    /// but is appended only after the entries it references, so its
    /// placeholder targets are defined earlier in the batch. Entries gated
    /// on absent input are skipped entirely, never emitted empty.
    pub async fn assemble(&self, record: &VisitRecord) -> Result<Vec<BundleEntry>> {
        let mut entries = vec![
            PatientBuilder::new(self.store)
                .build(&record.emr_no, &record.patient_name)
                .await?,
        ];

        let mut encounter = EncounterBuilder::new(self.store).build(record).await?;

        if !record.allergy.is_empty() {
            let allergy_builder = AllergyBuilder::new(self.store);
            for token in record.allergy.split('|') {
                entries.push(
                    allergy_builder
                        .build(&record.registration_id, token)
                        .await?,
                );
            }
        }

        if !record.intake_practitioner_id.is_empty() {
            entries.push(
                PractitionerBuilder::new(self.store)
                    .build(
                        StaffRole::Intake,
                        &record.intake_practitioner_id,
                        &record.intake_practitioner_name,
                    )
                    .await?,
            );
            entries.push(
                ConditionBuilder::new(self.store)
                    .build(
                        ConditionRole::Intake,
                        &record.registration_id,
                        &ConditionFields {
                            recorded_at: &record.intake_date,
                            patient_name: &record.patient_name,
                            practitioner_name: &record.intake_practitioner_name,
                            complaint: &record.complaint,
                            ..Default::default()
                        },
                    )
                    .await?,
            );
        }

        if !record.exam_practitioner_id.is_empty() {
            entries.push(
                PractitionerBuilder::new(self.store)
                    .build(
                        StaffRole::Exam,
                        &record.exam_practitioner_id,
                        &record.exam_practitioner_name,
                    )
                    .await?,
            );

            let observation_builder = ObservationBuilder::new(self.store);
            for sign in VitalSign::ALL {
                let reading = sign.reading(record);
                if reading.is_empty() {
                    continue;
                }
                entries.push(
                    observation_builder
                        .build(
                            &record.registration_id,
                            &record.patient_name,
                            &record.exam_practitioner_name,
                            &record.exam_date,
                            &VitalReadings::single(sign, reading),
                        )
                        .await?,
                );
            }

            if !record.location_id.is_empty() {
                entries.push(
                    LocationBuilder::new(self.store)
                        .build(&record.location_id, &record.location_name)
                        .await?,
                );
            }

            if !record.organization_id.is_empty() {
                entries.push(
                    OrganizationBuilder::new(self.store)
                        .build(&record.organization_id)
                        .await?,
                );
            }
        }

        // Structural removal: without an organization the encounter carries
        // no serviceProvider field at all, not an empty one.
        if record.organization_id.is_empty() {
            if let Some(resource) = encounter.resource.as_object_mut() {
                resource.remove("serviceProvider");
            }
        }
        entries.push(encounter);

        if !record.diagnosis_practitioner_id.is_empty() {
            entries.push(
                PractitionerBuilder::new(self.store)
                    .build(
                        StaffRole::Diagnosis,
                        &record.diagnosis_practitioner_id,
                        &record.diagnosis_practitioner_name,
                    )
                    .await?,
            );
            entries.push(
                ConditionBuilder::new(self.store)
                    .build(
                        ConditionRole::Diagnosis,
                        &record.registration_id,
                        &ConditionFields {
                            recorded_at: &record.diagnosis_date,
                            patient_name: &record.patient_name,
                            practitioner_name: &record.diagnosis_practitioner_name,
                            primary_code: &record.icdx_primary,
                            primary_name: &record.icdx_primary_name,
                            secondary_code: &record.icdx_secondary,
                            secondary_name: &record.icdx_secondary_name,
                            ..Default::default()
                        },
                    )
                    .await?,
            );
        }

        Ok(entries)
    }

    /// Assemble and, unless dry-run, submit the batch as one transaction.
    pub async fn assemble_and_submit(&self, record: &VisitRecord) -> Result<()> {
        let entries = self.assemble(record).await?;

        if self.dry_run {
            tracing::info!(
                registration_id = %record.registration_id,
                entries = entries.len(),
                "Dry run: bundle assembled but not submitted"
            );
        } else {
            self.store.submit_transaction(&entries).await?;
        }

        if self.debug {
            self.print_written_resources(record).await?;
        }

        Ok(())
    }

    /// Diagnostic only: re-fetch every resource the batch addressed, by the
    /// natural keys it was written with, and print what the store holds.
    async fn print_written_resources(&self, record: &VisitRecord) -> Result<()> {
        let visit_key = natural_key(&record.registration_id);
        let mut lookups: Vec<(ResourceKind, String)> =
            vec![(ResourceKind::Patient, record.emr_no.clone())];

        for practitioner_id in [
            &record.intake_practitioner_id,
            &record.exam_practitioner_id,
            &record.diagnosis_practitioner_id,
        ] {
            if !practitioner_id.is_empty() {
                lookups.push((ResourceKind::Practitioner, practitioner_id.clone()));
            }
        }

        for sign in VitalSign::ALL {
            if !sign.reading(record).is_empty() {
                lookups.push((
                    ResourceKind::Observation,
                    format!("{visit_key}-{}", sign.as_str()),
                ));
            }
        }

        lookups.push((ResourceKind::Encounter, visit_key.clone()));

        if !record.allergy.is_empty() {
            for token in record.allergy.split('|') {
                let category = parse_allergy(token).category_str();
                lookups.push((
                    ResourceKind::AllergyIntolerance,
                    format!("{visit_key}-{category}"),
                ));
            }
        }

        if !record.intake_practitioner_id.is_empty()
            || !record.diagnosis_practitioner_id.is_empty()
        {
            lookups.push((ResourceKind::Condition, visit_key.clone()));
        }

        if !record.location_id.is_empty() {
            lookups.push((ResourceKind::Location, natural_key(&record.location_id)));
        }
        if !record.organization_id.is_empty() {
            lookups.push((
                ResourceKind::Organization,
                natural_key(&record.organization_id),
            ));
        }

        for (kind, identifier) in lookups {
            let (resource, _) = self.store.fetch_by_identifier(kind, &identifier).await?;
            if let Some(resource) = resource {
                println!("=== {kind} {identifier} ===");
                println!("{}", serde_json::to_string_pretty(&resource)?);
            }
        }

        Ok(())
    }
}
