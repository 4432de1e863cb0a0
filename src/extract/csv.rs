//! Delimited-text row extraction
//!
//! Reads the visit export produced by the clinic system: comma-separated,
//! single-quote quoted, `NULL` for absent values, and headers that may carry
//! a type suffix (`ID_Pendaftaran TEXT`, `Suhu FLOAT`). Timestamps arrive as
//! `YYYY-MM-DD HH:MM:SS` local time and are normalized to the `+07:00`
//! offset the exchange expects.

use crate::domain::{BridgeError, Result, VisitRecord};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::Path;

/// Columns a complete visit export carries; a mismatch is logged, not fatal.
const EXPECTED_COLUMNS: [&str; 39] = [
    "ID_Pendaftaran",
    "EMR_No",
    "Nama_Pasien",
    "Payment_Type",
    "Encounter_Date",
    "History_Arrived_start_period",
    "History_Arrived_end_period",
    "History_Inprogress_start_period",
    "History_Inprogress_end_period",
    "History_Finished_start_period",
    "History_Finished_end_period",
    "Period_Start",
    "Period_End",
    "Location_ID",
    "Nama_Location",
    "Practitioner_ID_Anamnesa",
    "Nama_Practitioner_Anamnesa",
    "Tanggal_Anamnesa",
    "Keluhan",
    "Alergi",
    "Practitioner_ID_Periksa_Fisik",
    "Nama_Practitioner_Periksa_Fisik",
    "Tanggal_Periksa_Fisik",
    "Suhu",
    "Denyut_Nadi",
    "Nafas",
    "Sistolik",
    "Diastolik",
    "Lingkar_Perut",
    "Tinggi_Badan",
    "Berat_Badan",
    "Practitioner_ID_Diagnosis",
    "Nama_Practitioner_Diagnosis",
    "Tanggal_Diagnosis",
    "ICDX_Primer",
    "Nama_ICDX_Primer",
    "ICDX_Sekunder",
    "Nama_ICDX_Sekunder",
    "Organization_ID",
];

/// Read visit records from a delimited export file.
///
/// `limit` caps the number of rows; 0 reads everything.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or a row cannot be
/// parsed. Unknown or missing columns are tolerated (missing fields stay
/// empty).
pub fn read_visit_records(path: impl AsRef<Path>, limit: usize) -> Result<Vec<VisitRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'\'')
        .flexible(true)
        .from_path(path)
        .map_err(|e| BridgeError::Extract(format!("failed to open {}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| BridgeError::Extract(format!("failed to read header row: {e}")))?
        .clone();

    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| (base_column_name(header).to_string(), index))
        .collect();

    let missing: Vec<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !columns.contains_key(*name))
        // the patient name column goes by either header
        .filter(|name| *name != "Nama_Pasien" || !columns.contains_key("Patient_Name"))
        .collect();
    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            "Header does not match the expected visit export"
        );
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        if limit > 0 && index >= limit {
            break;
        }

        let row = row
            .map_err(|e| BridgeError::Extract(format!("failed to parse row {}: {e}", index + 1)))?;

        let field = |names: &[&str]| -> String {
            names
                .iter()
                .find_map(|name| columns.get(*name))
                .and_then(|&column| row.get(column))
                .map(str::trim)
                .filter(|value| *value != "NULL")
                .unwrap_or("")
                .to_string()
        };
        let timestamp = |names: &[&str]| normalize_timestamp(&field(names));

        records.push(VisitRecord {
            registration_id: field(&["ID_Pendaftaran"]),
            emr_no: field(&["EMR_No"]),
            patient_name: field(&["Nama_Pasien", "Patient_Name"]),
            payment_type: field(&["Payment_Type"]),
            encounter_date: timestamp(&["Encounter_Date"]),
            history_arrived_start: timestamp(&["History_Arrived_start_period"]),
            history_arrived_end: timestamp(&["History_Arrived_end_period"]),
            history_inprogress_start: timestamp(&["History_Inprogress_start_period"]),
            history_inprogress_end: timestamp(&["History_Inprogress_end_period"]),
            history_finished_start: timestamp(&["History_Finished_start_period"]),
            history_finished_end: timestamp(&["History_Finished_end_period"]),
            period_start: timestamp(&["Period_Start"]),
            period_end: timestamp(&["Period_End"]),
            location_id: field(&["Location_ID"]),
            location_name: field(&["Nama_Location"]),
            intake_practitioner_id: field(&["Practitioner_ID_Anamnesa"]),
            intake_practitioner_name: field(&["Nama_Practitioner_Anamnesa"]),
            intake_date: timestamp(&["Tanggal_Anamnesa"]),
            complaint: field(&["Keluhan"]),
            allergy: field(&["Alergi"]),
            exam_practitioner_id: field(&["Practitioner_ID_Periksa_Fisik"]),
            exam_practitioner_name: field(&["Nama_Practitioner_Periksa_Fisik"]),
            exam_date: timestamp(&["Tanggal_Periksa_Fisik"]),
            suhu: field(&["Suhu"]),
            denyut_nadi: field(&["Denyut_Nadi"]),
            nafas: field(&["Nafas"]),
            sistolik: field(&["Sistolik"]),
            diastolik: field(&["Diastolik"]),
            lingkar_perut: field(&["Lingkar_Perut"]),
            tinggi_badan: field(&["Tinggi_Badan"]),
            berat_badan: field(&["Berat_Badan"]),
            diagnosis_practitioner_id: field(&["Practitioner_ID_Diagnosis"]),
            diagnosis_practitioner_name: field(&["Nama_Practitioner_Diagnosis"]),
            diagnosis_date: timestamp(&["Tanggal_Diagnosis"]),
            icdx_primary: field(&["ICDX_Primer"]),
            icdx_primary_name: field(&["Nama_ICDX_Primer"]),
            icdx_secondary: field(&["ICDX_Sekunder"]),
            icdx_secondary_name: field(&["Nama_ICDX_Sekunder"]),
            organization_id: field(&["Organization_ID"]),
        });
    }

    tracing::info!(
        path = %path.display(),
        records = records.len(),
        "Extracted visit records"
    );

    Ok(records)
}

/// Strip the type suffix off a typed header (`ID_Pendaftaran TEXT` →
/// `ID_Pendaftaran`); plain headers pass through unchanged.
fn base_column_name(header: &str) -> &str {
    header
        .trim()
        .split_whitespace()
        .next()
        .unwrap_or("")
}

/// Normalize a `YYYY-MM-DD HH:MM:SS` timestamp to the exchange's
/// `YYYY-MM-DDTHH:MM:SS+07:00` form; anything else passes through unchanged.
pub fn normalize_timestamp(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        Ok(timestamp) => timestamp.format("%Y-%m-%dT%H:%M:%S+07:00").to_string(),
        Err(_) => raw.to_string(),
    }
}
