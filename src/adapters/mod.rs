//! External system integrations.
//!
//! - [`fhir`] - the remote FHIR exchange (authenticated client, token
//!   lifecycle, and the [`fhir::ResourceStore`] capability trait)
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the
//! transformation core can be exercised against in-memory doubles.

pub mod fhir;
