//! Resource builders
//!
//! One builder per resource kind. Each knows how to derive its natural key,
//! construct its document fragment, merge it onto prior remote state, and
//! wrap the result in a transaction-bundle entry.
//!
//! Cross-references between fragments use batch-local placeholder anchors
//! (`urn:uuid:*_fullUrl`) instead of real resource ids; the store resolves
//! them to persisted identifiers at commit time. The anchor constants below
//! are the single source for those strings.
//!
//! Builders take the store capability as an explicit constructor argument so
//! tests can inject an in-memory double.

pub mod allergy;
pub mod condition;
pub mod encounter;
pub mod location;
pub mod observation;
pub mod organization;
pub mod patient;
pub mod practitioner;

pub use allergy::{parse_allergy, AllergyBuilder, AllergyCategory};
pub use condition::{ConditionBuilder, ConditionFields, ConditionRole};
pub use encounter::EncounterBuilder;
pub use location::LocationBuilder;
pub use observation::{ObservationBuilder, VitalReadings, VitalSign};
pub use organization::OrganizationBuilder;
pub use patient::PatientBuilder;
pub use practitioner::{PractitionerBuilder, StaffRole};

/// Anchor of the single Patient entry
pub const PATIENT_ANCHOR: &str = "urn:uuid:patient_fullUrl";

/// Role-less practitioner anchor used by Encounter participants and
/// AllergyIntolerance actors
pub const PRACTITIONER_ANCHOR: &str = "urn:uuid:practitioner_fullUrl";

/// Anchor of the single Encounter entry
pub const ENCOUNTER_ANCHOR: &str = "urn:uuid:encounter_fullUrl";

/// Anchor shared by both Condition variants
pub const CONDITION_ANCHOR: &str = "urn:uuid:condition_fullUrl";

/// Anchor of the Location entry
pub const LOCATION_ANCHOR: &str = "urn:uuid:location_fullUrl";

/// Anchor of the Organization entry
pub const ORGANIZATION_ANCHOR: &str = "urn:uuid:organization_fullUrl";
