//! Resource vocabulary of the target interchange schema
//!
//! The bridge writes eight FHIR resource kinds. Every entry in a transaction
//! bundle pairs one resource document with a write directive addressed by
//! natural key (`<Type>?identifier=<key>`), so the store decides
//! create-vs-replace on its own.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The fixed set of resource kinds this bridge produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patient,
    Practitioner,
    Observation,
    Encounter,
    Condition,
    AllergyIntolerance,
    Location,
    Organization,
}

impl ResourceKind {
    /// The `resourceType` discriminator string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Practitioner => "Practitioner",
            ResourceKind::Observation => "Observation",
            ResourceKind::Encounter => "Encounter",
            ResourceKind::Condition => "Condition",
            ResourceKind::AllergyIntolerance => "AllergyIntolerance",
            ResourceKind::Location => "Location",
            ResourceKind::Organization => "Organization",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(ResourceKind::Patient),
            "Practitioner" => Ok(ResourceKind::Practitioner),
            "Observation" => Ok(ResourceKind::Observation),
            "Encounter" => Ok(ResourceKind::Encounter),
            "Condition" => Ok(ResourceKind::Condition),
            "AllergyIntolerance" => Ok(ResourceKind::AllergyIntolerance),
            "Location" => Ok(ResourceKind::Location),
            "Organization" => Ok(ResourceKind::Organization),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}

/// HTTP-style write method for a bundle entry
///
/// `Put` is the idempotent upsert used everywhere by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMethod {
    #[default]
    Put,
    Post,
}

impl WriteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMethod::Put => "PUT",
            WriteMethod::Post => "POST",
        }
    }
}

/// Write directive attached to a bundle entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WriteRequest {
    pub method: String,
    pub url: String,
}

/// One entry of a transaction bundle: a resource document, its batch-local
/// placeholder anchor, and the natural-key write directive.
#[derive(Debug, Clone, Serialize)]
pub struct BundleEntry {
    #[serde(rename = "fullUrl")]
    pub full_url: String,
    pub resource: Value,
    pub request: WriteRequest,
}

impl BundleEntry {
    /// Wrap a resource document with its anchor and write directive.
    pub fn new(
        full_url: impl Into<String>,
        resource: Value,
        method: WriteMethod,
        kind: ResourceKind,
        identifier: &str,
    ) -> Self {
        Self {
            full_url: full_url.into(),
            resource,
            request: WriteRequest {
                method: method.as_str().to_string(),
                url: format!("{kind}?identifier={identifier}"),
            },
        }
    }
}

/// Derive the business identifier used as a natural key.
///
/// Spaces are collapsed to `-` so repeated runs over the same input address
/// the same remote document.
pub fn natural_key(raw: &str) -> String {
    raw.replace(' ', "-")
}
