//! Wire types for the FHIR exchange and the token endpoint

use serde::Deserialize;
use serde_json::Value;

/// Search-result envelope returned by identifier lookups
///
/// Only the pieces the bridge reads are modeled; the rest of the searchset
/// Bundle is ignored.
#[derive(Debug, Deserialize)]
pub struct SearchBundle {
    #[serde(default)]
    pub entry: Vec<SearchEntry>,
}

/// One entry of a searchset Bundle
#[derive(Debug, Deserialize)]
pub struct SearchEntry {
    #[serde(rename = "fullUrl", default)]
    pub full_url: String,
    pub resource: Value,
}

/// Keycloak token-endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_bundle_with_entries() {
        let body = r#"{
            "resourceType": "Bundle",
            "type": "searchset",
            "total": 1,
            "entry": [{
                "fullUrl": "https://fhir.example.id/api/Patient/abc",
                "resource": {"resourceType": "Patient", "id": "abc"}
            }]
        }"#;

        let bundle: SearchBundle = serde_json::from_str(body).unwrap();
        assert_eq!(bundle.entry.len(), 1);
        assert_eq!(
            bundle.entry[0].full_url,
            "https://fhir.example.id/api/Patient/abc"
        );
        assert_eq!(bundle.entry[0].resource["id"], "abc");
    }

    #[test]
    fn test_search_bundle_without_entry_key() {
        let body = r#"{"resourceType": "Bundle", "type": "searchset", "total": 0}"#;
        let bundle: SearchBundle = serde_json::from_str(body).unwrap();
        assert!(bundle.entry.is_empty());
    }

    #[test]
    fn test_token_response() {
        let body = r#"{"access_token": "tok", "expires_in": 300, "token_type": "Bearer"}"#;
        let response: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.access_token, "tok");
    }
}
