//! Normalized clinical-visit input record
//!
//! One `VisitRecord` is produced per input row (CSV export) or request
//! payload, then consumed once by the assembler. Every field is a scalar
//! string; an empty string means the field was absent in the source. Only the
//! registration id (visit identifier) and EMR number (subject identifier) are
//! required for a meaningful record; everything else gates optional
//! resources.
//!
//! Serde aliases match the column names of the visit export so a JSON request
//! payload deserializes directly into this type.

use serde::Deserialize;

/// One flat visit record, normalized from any of the ingestion sources.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisitRecord {
    /// Visit identifier; seed of every visit-scoped natural key
    #[serde(alias = "ID_Pendaftaran")]
    pub registration_id: String,

    /// Subject identifier (medical record number)
    #[serde(alias = "EMR_No")]
    pub emr_no: String,

    #[serde(alias = "Patient_Name", alias = "Nama_Pasien")]
    pub patient_name: String,

    #[serde(alias = "Payment_Type")]
    pub payment_type: String,

    #[serde(alias = "Encounter_Date")]
    pub encounter_date: String,

    #[serde(alias = "History_Arrived_start_period")]
    pub history_arrived_start: String,
    #[serde(alias = "History_Arrived_end_period")]
    pub history_arrived_end: String,
    #[serde(alias = "History_Inprogress_start_period")]
    pub history_inprogress_start: String,
    #[serde(alias = "History_Inprogress_end_period")]
    pub history_inprogress_end: String,
    #[serde(alias = "History_Finished_start_period")]
    pub history_finished_start: String,
    #[serde(alias = "History_Finished_end_period")]
    pub history_finished_end: String,

    #[serde(alias = "Period_Start")]
    pub period_start: String,
    #[serde(alias = "Period_End")]
    pub period_end: String,

    #[serde(alias = "Location_ID")]
    pub location_id: String,
    #[serde(alias = "Nama_Location")]
    pub location_name: String,

    /// Intake (anamnesis) stage
    #[serde(alias = "Practitioner_ID_Anamnesa")]
    pub intake_practitioner_id: String,
    #[serde(alias = "Nama_Practitioner_Anamnesa")]
    pub intake_practitioner_name: String,
    #[serde(alias = "Tanggal_Anamnesa")]
    pub intake_date: String,

    /// Chief complaint recorded at intake
    #[serde(alias = "Keluhan")]
    pub complaint: String,

    /// `|`-delimited allergy descriptions, each `label: detail`
    #[serde(alias = "Alergi")]
    pub allergy: String,

    /// Physical examination stage
    #[serde(alias = "Practitioner_ID_Periksa_Fisik")]
    pub exam_practitioner_id: String,
    #[serde(alias = "Nama_Practitioner_Periksa_Fisik")]
    pub exam_practitioner_name: String,
    #[serde(alias = "Tanggal_Periksa_Fisik")]
    pub exam_date: String,

    // Vital-sign readings, one field per measured indicator
    #[serde(alias = "Suhu")]
    pub suhu: String,
    #[serde(alias = "Denyut_Nadi")]
    pub denyut_nadi: String,
    #[serde(alias = "Nafas")]
    pub nafas: String,
    #[serde(alias = "Sistolik")]
    pub sistolik: String,
    #[serde(alias = "Diastolik")]
    pub diastolik: String,
    #[serde(alias = "Lingkar_Perut")]
    pub lingkar_perut: String,
    #[serde(alias = "Tinggi_Badan")]
    pub tinggi_badan: String,
    #[serde(alias = "Berat_Badan")]
    pub berat_badan: String,

    /// Diagnosis stage
    #[serde(alias = "Practitioner_ID_Diagnosis")]
    pub diagnosis_practitioner_id: String,
    #[serde(alias = "Nama_Practitioner_Diagnosis")]
    pub diagnosis_practitioner_name: String,
    #[serde(alias = "Tanggal_Diagnosis")]
    pub diagnosis_date: String,

    #[serde(alias = "ICDX_Primer")]
    pub icdx_primary: String,
    #[serde(alias = "Nama_ICDX_Primer")]
    pub icdx_primary_name: String,
    #[serde(alias = "ICDX_Sekunder")]
    pub icdx_secondary: String,
    #[serde(alias = "Nama_ICDX_Sekunder")]
    pub icdx_secondary_name: String,

    #[serde(alias = "Organization_ID")]
    pub organization_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_all_empty() {
        let record = VisitRecord::default();
        assert!(record.registration_id.is_empty());
        assert!(record.suhu.is_empty());
        assert!(record.organization_id.is_empty());
    }

    #[test]
    fn test_deserializes_export_column_names() {
        let payload = r#"{
            "ID_Pendaftaran": "REG 001",
            "EMR_No": "PAS20146165",
            "Patient_Name": "Siti Rahma",
            "Suhu": "36.5",
            "Practitioner_ID_Periksa_Fisik": "N10000001",
            "Organization_ID": "P3205150101"
        }"#;

        let record: VisitRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(record.registration_id, "REG 001");
        assert_eq!(record.emr_no, "PAS20146165");
        assert_eq!(record.patient_name, "Siti Rahma");
        assert_eq!(record.suhu, "36.5");
        assert_eq!(record.exam_practitioner_id, "N10000001");
        assert_eq!(record.organization_id, "P3205150101");
        // Unlisted fields default to empty
        assert!(record.allergy.is_empty());
    }

    #[test]
    fn test_deserializes_field_names_directly() {
        let payload = r#"{"registration_id": "REG 002", "emr_no": "PAS1"}"#;
        let record: VisitRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(record.registration_id, "REG 002");
        assert_eq!(record.emr_no, "PAS1");
    }
}
