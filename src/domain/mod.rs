//! Domain models and types.
//!
//! This module contains the core vocabulary of the bridge:
//!
//! - **Input model** ([`VisitRecord`]): one normalized clinical-visit row
//! - **Output model** ([`BundleEntry`], [`ResourceKind`], [`WriteMethod`]):
//!   the transaction-bundle entries the bridge writes
//! - **Error types** ([`BridgeError`], [`FhirError`])
//! - **Result type alias** ([`Result`])
//!
//! Resource documents themselves are untyped JSON trees
//! (`serde_json::Value`); the builders in [`crate::core`] own their shape.

pub mod errors;
pub mod resource;
pub mod result;
pub mod visit;

// Re-export commonly used types for convenience
pub use errors::{BridgeError, FhirError};
pub use resource::{natural_key, BundleEntry, ResourceKind, WriteMethod, WriteRequest};
pub use result::Result;
pub use visit::VisitRecord;
