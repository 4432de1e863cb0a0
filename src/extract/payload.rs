//! Structured request payload extraction
//!
//! A single visit can arrive as one JSON object keyed by the export's
//! column names; serde aliases on [`VisitRecord`] map them directly.

use crate::domain::{BridgeError, Result, VisitRecord};
use serde_json::Value;

/// Parse one visit record from a JSON payload string.
pub fn from_json_str(payload: &str) -> Result<VisitRecord> {
    serde_json::from_str(payload)
        .map_err(|e| BridgeError::Extract(format!("invalid visit payload: {e}")))
}

/// Parse one visit record from an already-deserialized JSON value.
pub fn from_value(payload: Value) -> Result<VisitRecord> {
    serde_json::from_value(payload)
        .map_err(|e| BridgeError::Extract(format!("invalid visit payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_str_with_export_names() {
        let record = from_json_str(
            r#"{
                "ID_Pendaftaran": "REG 001",
                "EMR_No": "PAS1",
                "Alergi": "Obat: Amoxicillin|Makanan: Kacang",
                "Suhu": "36.5"
            }"#,
        )
        .unwrap();

        assert_eq!(record.registration_id, "REG 001");
        assert_eq!(record.allergy, "Obat: Amoxicillin|Makanan: Kacang");
        assert_eq!(record.suhu, "36.5");
        assert!(record.location_id.is_empty());
    }

    #[test]
    fn test_from_value() {
        let record = from_value(json!({"ID_Pendaftaran": "REG 002", "EMR_No": "PAS2"})).unwrap();
        assert_eq!(record.registration_id, "REG 002");
    }

    #[test]
    fn test_invalid_payload_is_error() {
        assert!(from_json_str("not json").is_err());
        assert!(matches!(
            from_json_str("[1, 2]"),
            Err(BridgeError::Extract(_))
        ));
    }
}
