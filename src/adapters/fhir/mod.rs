//! FHIR exchange adapter
//!
//! The remote side of the bridge: the [`ResourceStore`] capability trait,
//! its reqwest-backed [`FhirClient`] implementation, and the bearer-token
//! lifecycle.

pub mod auth;
pub mod client;
pub mod models;
pub mod store;

pub use auth::{KeycloakAuth, TokenFile};
pub use client::FhirClient;
pub use store::ResourceStore;
