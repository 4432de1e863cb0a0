//! Observation builder
//!
//! One Observation is written per measured vital sign. The indicator (the
//! segment appended to the natural key and the selector for the coded
//! sections) is computed by walking [`VitalSign::ALL`] in its fixed order
//! and keeping the last sign with a non-empty reading. The coded sections
//! (category, code, valueQuantity) are those of the indicator.

use super::{practitioner::StaffRole, ENCOUNTER_ANCHOR, PATIENT_ANCHOR};
use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{natural_key, BundleEntry, ResourceKind, Result, VisitRecord, WriteMethod};
use serde_json::{json, Value};

const LOINC: &str = "http://loinc.org";
const SNOMED: &str = "http://snomed.info/sct";
const UCUM: &str = "http://unitsofmeasure.org";
const OBSERVATION_CATEGORY: &str = "http://terminology.hl7.org/CodeSystem/observation-category";

/// The eight vital-sign indicators, in their fixed evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalSign {
    /// Body temperature
    Suhu,
    /// Heart rate
    DenyutNadi,
    /// Respiratory rate
    Nafas,
    /// Systolic blood pressure
    Sistolik,
    /// Diastolic blood pressure
    Diastolik,
    /// Abdominal circumference
    LingkarPerut,
    /// Body height
    TinggiBadan,
    /// Body weight
    BeratBadan,
}

impl VitalSign {
    /// Fixed evaluation order; indicator selection and the encounter's
    /// reason list both walk this array.
    pub const ALL: [VitalSign; 8] = [
        VitalSign::Suhu,
        VitalSign::DenyutNadi,
        VitalSign::Nafas,
        VitalSign::Sistolik,
        VitalSign::Diastolik,
        VitalSign::LingkarPerut,
        VitalSign::TinggiBadan,
        VitalSign::BeratBadan,
    ];

    /// Indicator segment used in natural keys and anchors
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalSign::Suhu => "suhu",
            VitalSign::DenyutNadi => "denyut_nadi",
            VitalSign::Nafas => "nafas",
            VitalSign::Sistolik => "sistolik",
            VitalSign::Diastolik => "diastolik",
            VitalSign::LingkarPerut => "lingkar_perut",
            VitalSign::TinggiBadan => "tinggi_badan",
            VitalSign::BeratBadan => "berat_badan",
        }
    }

    /// Batch-local anchor of this indicator's Observation entry
    pub fn anchor(&self) -> String {
        format!("urn:uuid:observation_{}_fullUrl", self.as_str())
    }

    /// This indicator's reading within a visit record
    pub fn reading<'r>(&self, record: &'r VisitRecord) -> &'r str {
        match self {
            VitalSign::Suhu => &record.suhu,
            VitalSign::DenyutNadi => &record.denyut_nadi,
            VitalSign::Nafas => &record.nafas,
            VitalSign::Sistolik => &record.sistolik,
            VitalSign::Diastolik => &record.diastolik,
            VitalSign::LingkarPerut => &record.lingkar_perut,
            VitalSign::TinggiBadan => &record.tinggi_badan,
            VitalSign::BeratBadan => &record.berat_badan,
        }
    }

    /// Observation category block; temperature and pulse carry none.
    fn category(&self) -> Option<Value> {
        let (code, display) = match self {
            VitalSign::Suhu | VitalSign::DenyutNadi => return None,
            VitalSign::LingkarPerut => ("exam", "Exam"),
            _ => ("vital-signs", "Vital Signs"),
        };

        Some(json!([{
            "coding": [{
                "system": OBSERVATION_CATEGORY,
                "code": code,
                "display": display,
            }]
        }]))
    }

    /// Coded element for this indicator
    fn code(&self) -> Value {
        let (system, code, display, text) = match self {
            VitalSign::Suhu => (LOINC, "8310-5", "Body temperature", "Suhu Badan (Celcius)"),
            VitalSign::DenyutNadi => (LOINC, "8867-4", "Heart rate", "Nadi (x/menit)"),
            VitalSign::Nafas => (
                LOINC,
                "9279-1",
                "Respiratory rate",
                "Respiratory Rate (x/menit)",
            ),
            VitalSign::Sistolik => (
                LOINC,
                "8480-6",
                "Systolic blood pressure",
                "Tekanan Darah Sistolik",
            ),
            VitalSign::Diastolik => (
                LOINC,
                "8462-4",
                "Diastolic blood pressure",
                "Tekanan Darah Diastolik",
            ),
            VitalSign::LingkarPerut => (
                SNOMED,
                "396552003",
                "Abdominal circumference",
                "Lingkar Perut",
            ),
            VitalSign::TinggiBadan => (LOINC, "8302-2", "Body height", "Tinggi badan (cm)"),
            VitalSign::BeratBadan => (
                LOINC,
                "29463-7",
                "Body weight",
                "Berat Badan Saat Ini (Kg)",
            ),
        };

        json!({
            "coding": [{
                "system": system,
                "code": code,
                "display": display,
            }],
            "text": text,
        })
    }

    /// Quantity element; readings stay strings, as delivered by the source.
    fn quantity(&self, value: &str) -> Value {
        let (unit, code) = match self {
            VitalSign::Suhu => ("C", "Cel"),
            VitalSign::DenyutNadi => ("beats/minute", "/min"),
            VitalSign::Nafas => ("breaths/min", "/min"),
            VitalSign::Sistolik | VitalSign::Diastolik => ("mm[Hg]", "mm[Hg]"),
            VitalSign::LingkarPerut | VitalSign::TinggiBadan => ("cm", "cm"),
            VitalSign::BeratBadan => ("kg", "kg"),
        };

        json!({
            "value": value,
            "unit": unit,
            "code": code,
            "system": UCUM,
        })
    }
}

/// One set of vital-sign readings, empty meaning unmeasured
#[derive(Debug, Clone, Default)]
pub struct VitalReadings {
    pub suhu: String,
    pub denyut_nadi: String,
    pub nafas: String,
    pub sistolik: String,
    pub diastolik: String,
    pub lingkar_perut: String,
    pub tinggi_badan: String,
    pub berat_badan: String,
}

impl VitalReadings {
    /// Readings with exactly one indicator set; the batch path builds one
    /// Observation per measured sign.
    pub fn single(sign: VitalSign, value: impl Into<String>) -> Self {
        let mut readings = Self::default();
        *readings.slot(sign) = value.into();
        readings
    }

    fn slot(&mut self, sign: VitalSign) -> &mut String {
        match sign {
            VitalSign::Suhu => &mut self.suhu,
            VitalSign::DenyutNadi => &mut self.denyut_nadi,
            VitalSign::Nafas => &mut self.nafas,
            VitalSign::Sistolik => &mut self.sistolik,
            VitalSign::Diastolik => &mut self.diastolik,
            VitalSign::LingkarPerut => &mut self.lingkar_perut,
            VitalSign::TinggiBadan => &mut self.tinggi_badan,
            VitalSign::BeratBadan => &mut self.berat_badan,
        }
    }

    pub fn value_of(&self, sign: VitalSign) -> &str {
        match sign {
            VitalSign::Suhu => &self.suhu,
            VitalSign::DenyutNadi => &self.denyut_nadi,
            VitalSign::Nafas => &self.nafas,
            VitalSign::Sistolik => &self.sistolik,
            VitalSign::Diastolik => &self.diastolik,
            VitalSign::LingkarPerut => &self.lingkar_perut,
            VitalSign::TinggiBadan => &self.tinggi_badan,
            VitalSign::BeratBadan => &self.berat_badan,
        }
    }

    /// The indicator: the last sign in the fixed order with a reading.
    pub fn indicator(&self) -> Option<VitalSign> {
        VitalSign::ALL
            .into_iter()
            .filter(|sign| !self.value_of(*sign).is_empty())
            .last()
    }
}

pub struct ObservationBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> ObservationBuilder<'a> {
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
    pub fn fragment(
        identifier: &str,
        patient_name: &str,
        practitioner_name: &str,
        effective_at: &str,
        readings: &VitalReadings,
    ) -> Value {
        let indicator = readings.indicator();
        let suffix = indicator.map(|sign| sign.as_str()).unwrap_or("");

        let mut resource = json!({
            "resourceType": "Observation",
            "identifier": [{
                "use": "official",
                "system": "https://sys-ids.kemkes.go.id/observation",
                "value": format!("{identifier}-{suffix}"),
            }],
            "status": "final",
            "effectiveDateTime": effective_at,
            "subject": {
                "reference": PATIENT_ANCHOR,
                "display": patient_name,
                "type": "Patient",
            },
            "performer": [{
                "reference": StaffRole::Exam.anchor(),
                "display": practitioner_name,
                "type": "Practitioner",
            }],
            "encounter": {
                "reference": ENCOUNTER_ANCHOR,
                "type": "Encounter",
            },
        });

        if let Some(sign) = indicator {
            if let Some(category) = sign.category() {
                resource["category"] = category;
            }
            resource["code"] = sign.code();
            resource["valueQuantity"] = sign.quantity(readings.value_of(sign));
        }

        resource
    }

    /// Build the bundle entry. The prior-state lookup uses the bare visit
    /// key; the indicator segment only extends the written identifier and
    /// the write directive.
    pub async fn build(
        &self,
        registration_id: &str,
        patient_name: &str,
        practitioner_name: &str,
        effective_at: &str,
        readings: &VitalReadings,
    ) -> Result<BundleEntry> {
        let identifier = natural_key(registration_id);
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::Observation, &identifier)
            .await?;

        let resource = merge(
            prior,
            Self::fragment(
                &identifier,
                patient_name,
                practitioner_name,
                effective_at,
                readings,
            ),
        );

        let suffix = readings
            .indicator()
            .map(|sign| sign.as_str())
            .unwrap_or("");
        let keyed = format!("{identifier}-{suffix}");

        tracing::info!(
            method = self.method.as_str(),
            identifier = %keyed,
            "Staging Observation entry"
        );

        Ok(BundleEntry::new(
            format!("urn:uuid:observation_{suffix}_fullUrl"),
            resource,
            self.method,
            ResourceKind::Observation,
            &keyed,
        ))
    }

    pub async fn upsert(
        &self,
        registration_id: &str,
        patient_name: &str,
        practitioner_name: &str,
        effective_at: &str,
        readings: &VitalReadings,
    ) -> Result<()> {
        let entry = self
            .build(
                registration_id,
                patient_name,
                practitioner_name,
                effective_at,
                readings,
            )
            .await?;
        self.store.submit_transaction(&[entry]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_indicator_empty_readings() {
        assert_eq!(VitalReadings::default().indicator(), None);
    }

    #[test]
    fn test_indicator_single() {
        let readings = VitalReadings::single(VitalSign::Suhu, "36.5");
        assert_eq!(readings.indicator(), Some(VitalSign::Suhu));
    }

    #[test]
    fn test_indicator_last_in_order_wins() {
        let mut readings = VitalReadings::single(VitalSign::BeratBadan, "62");
        readings.suhu = "36.5".to_string();
        // berat_badan is later in the fixed order, regardless of set order
        assert_eq!(readings.indicator(), Some(VitalSign::BeratBadan));
    }

    #[test]
    fn test_fragment_temperature() {
        let readings = VitalReadings::single(VitalSign::Suhu, "36.5");
        let fragment =
            ObservationBuilder::fragment("REG-1", "Siti", "dr. Budi", "2024-10-17T08:00:00+07:00", &readings);

        assert_eq!(fragment["identifier"][0]["value"], "REG-1-suhu");
        assert_eq!(fragment["code"]["coding"][0]["code"], "8310-5");
        assert_eq!(fragment["code"]["coding"][0]["system"], "http://loinc.org");
        assert_eq!(fragment["valueQuantity"]["value"], "36.5");
        assert_eq!(fragment["valueQuantity"]["code"], "Cel");
        // Temperature carries no category block
        assert!(fragment.get("category").is_none());
    }

    #[test]
    fn test_fragment_respiration_has_category() {
        let readings = VitalReadings::single(VitalSign::Nafas, "20");
        let fragment = ObservationBuilder::fragment("REG-1", "", "", "", &readings);

        assert_eq!(fragment["category"][0]["coding"][0]["code"], "vital-signs");
        assert_eq!(fragment["code"]["coding"][0]["code"], "9279-1");
    }

    #[test]
    fn test_fragment_abdominal_circumference_is_exam_snomed() {
        let readings = VitalReadings::single(VitalSign::LingkarPerut, "80");
        let fragment = ObservationBuilder::fragment("REG-1", "", "", "", &readings);

        assert_eq!(fragment["category"][0]["coding"][0]["code"], "exam");
        assert_eq!(
            fragment["code"]["coding"][0]["system"],
            "http://snomed.info/sct"
        );
        assert_eq!(fragment["code"]["coding"][0]["code"], "396552003");
    }

    #[test]
    fn test_fragment_no_readings_has_no_coded_sections() {
        let fragment =
            ObservationBuilder::fragment("REG-1", "", "", "", &VitalReadings::default());

        assert_eq!(fragment["identifier"][0]["value"], "REG-1-");
        assert!(fragment.get("code").is_none());
        assert!(fragment.get("valueQuantity").is_none());
    }

    #[test]
    fn test_fragment_cross_references() {
        let readings = VitalReadings::single(VitalSign::Sistolik, "120");
        let fragment = ObservationBuilder::fragment("REG-1", "Siti", "dr. Budi", "", &readings);

        assert_eq!(fragment["subject"]["reference"], "urn:uuid:patient_fullUrl");
        assert_eq!(
            fragment["performer"][0]["reference"],
            "urn:uuid:practitioner_exam_fullUrl"
        );
        assert_eq!(
            fragment["encounter"]["reference"],
            "urn:uuid:encounter_fullUrl"
        );
    }

    #[test_case(VitalSign::Suhu, "suhu")]
    #[test_case(VitalSign::DenyutNadi, "denyut_nadi")]
    #[test_case(VitalSign::Nafas, "nafas")]
    #[test_case(VitalSign::Sistolik, "sistolik")]
    #[test_case(VitalSign::Diastolik, "diastolik")]
    #[test_case(VitalSign::LingkarPerut, "lingkar_perut")]
    #[test_case(VitalSign::TinggiBadan, "tinggi_badan")]
    #[test_case(VitalSign::BeratBadan, "berat_badan")]
    fn test_indicator_segments(sign: VitalSign, segment: &str) {
        assert_eq!(sign.as_str(), segment);
        assert_eq!(
            sign.anchor(),
            format!("urn:uuid:observation_{segment}_fullUrl")
        );
    }
}
