//! AllergyIntolerance builder
//!
//! Allergy text arrives as `label: detail` (e.g. `Obat: Amoxicillin`). The
//! label maps to one of three categories; text that doesn't parse yields an
//! empty category, which in turn produces a `{visit-key}-` natural key. That
//! ambiguity is accepted input, not an error.

use super::{ENCOUNTER_ANCHOR, PATIENT_ANCHOR, PRACTITIONER_ANCHOR};
use crate::adapters::fhir::ResourceStore;
use crate::core::merge::merge;
use crate::domain::{natural_key, BundleEntry, ResourceKind, Result, WriteMethod};
use regex::Regex;
use serde_json::{json, Value};

/// Allergy category derived from the text label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllergyCategory {
    Medication,
    Food,
    Environment,
}

impl AllergyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllergyCategory::Medication => "medication",
            AllergyCategory::Food => "food",
            AllergyCategory::Environment => "environment",
        }
    }

    fn display(&self) -> &'static str {
        match self {
            AllergyCategory::Medication => "Medication",
            AllergyCategory::Food => "Food",
            AllergyCategory::Environment => "Environment",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Obat" => Some(AllergyCategory::Medication),
            "Makanan" => Some(AllergyCategory::Food),
            "Umum" => Some(AllergyCategory::Environment),
            _ => None,
        }
    }
}

/// Parsed allergy token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAllergy {
    pub category: Option<AllergyCategory>,
    pub detail: String,
}

impl ParsedAllergy {
    /// Category segment used in the natural key, system URI, and anchor;
    /// empty when the token didn't parse.
    pub fn category_str(&self) -> &'static str {
        self.category.map(|c| c.as_str()).unwrap_or("")
    }
}

/// Capitalize the token the way the source data is normalized: first
/// character uppercased, the rest lowercased.
fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Parse one allergy token as `label: detail`.
pub fn parse_allergy(token: &str) -> ParsedAllergy {
    let normalized = capitalize(token);
    let pattern = Regex::new(r"^(\w+)\s*:\s*(.+)$").unwrap();

    match pattern.captures(&normalized) {
        Some(captures) => ParsedAllergy {
            category: AllergyCategory::from_label(&captures[1]),
            detail: captures[2].to_string(),
        },
        None => ParsedAllergy {
            category: None,
            detail: String::new(),
        },
    }
}

pub struct AllergyBuilder<'a> {
    store: &'a dyn ResourceStore,
    method: WriteMethod,
}

impl<'a> AllergyBuilder<'a> {
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

    /// Pure fragment construction from the derived visit identifier and one
    /// raw allergy token.
    pub fn fragment(identifier: &str, token: &str) -> Value {
        let parsed = parse_allergy(token);
        let category = parsed.category_str();

        let mut resource = json!({
            "resourceType": "AllergyIntolerance",
            "identifier": [{
                "use": "official",
                "system": format!("https://sys-ids.kemkes.go.id/allergyintolerance-{category}"),
                "value": format!("{identifier}-{category}"),
            }],
            "patient": {
                "reference": PATIENT_ANCHOR,
                "type": "Patient",
            },
            "participant": [{
                "actor": {
                    "reference": PRACTITIONER_ANCHOR,
                    "type": "Practitioner",
                },
                "individual": {
                    "reference": PATIENT_ANCHOR,
                    "type": "Patient",
                },
            }],
            "clinicalStatus": {
                "coding": [{
                    "system": "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical",
                    "code": "active",
                    "display": "Active",
                }]
            },
            "code": {
                "text": format!("Alergi: {}", parsed.detail),
            },
            "encounter": {
                "reference": ENCOUNTER_ANCHOR,
                "type": "Encounter",
            },
        });

        if let Some(kind) = parsed.category {
            resource["category"] = json!([{
                "coding": [{
                    "system": "http://hl7.org/fhir/allergy-intolerance-category",
                    "code": kind.as_str(),
                    "display": kind.display(),
                }]
            }]);
        }

        resource
    }

    /// Build the bundle entry for one allergy token. The prior-state lookup
    /// uses the bare visit key; the category segment only extends the
    /// written identifier and the write directive.
    pub async fn build(&self, registration_id: &str, token: &str) -> Result<BundleEntry> {
        let identifier = natural_key(registration_id);
        let (prior, _) = self
            .store
            .fetch_by_identifier(ResourceKind::AllergyIntolerance, &identifier)
            .await?;
        let resource = merge(prior, Self::fragment(&identifier, token));

        let category = parse_allergy(token).category_str();
        let keyed = format!("{identifier}-{category}");

        tracing::info!(
            method = self.method.as_str(),
            identifier = %keyed,
            "Staging AllergyIntolerance entry"
        );

        Ok(BundleEntry::new(
            format!("urn:uuid:allergyIntolerance_{category}_fullUrl"),
            resource,
            self.method,
            ResourceKind::AllergyIntolerance,
            &keyed,
        ))
    }

    pub async fn upsert(&self, registration_id: &str, token: &str) -> Result<()> {
        let entry = self.build(registration_id, token).await?;
        self.store.submit_transaction(&[entry]).await
    }
}
