// satusehat-bridge - Clinical visit records to FHIR transaction bundles
// Copyright (c) 2025 Satusehat Bridge Contributors
// Licensed under the MIT License

//! # satusehat-bridge
//!
//! satusehat-bridge ingests tabular clinical-visit records from puskesmas
//! exports and submits them as atomic FHIR transaction bundles to a
//! SATUSEHAT-compatible national health-data exchange.
//!
//! ## Overview
//!
//! One flat visit record fans out into up to ten interlinked resource
//! documents (Patient, up to three Practitioners, an Encounter, up to eight
//! Observations, up to two Conditions, any number of AllergyIntolerances, a
//! Location, and an Organization), cross-referenced by batch-local
//! placeholder anchors, merged field-by-field against prior remote state,
//! and written as one all-or-nothing transaction.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - The transformation core (merge engine, builders, assembler)
//! - [`adapters`] - The FHIR exchange client and its capability trait
//! - [`extract`] - Row extraction from CSV exports and JSON payloads
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use satusehat_bridge::adapters::fhir::FhirClient;
//! use satusehat_bridge::config::load_config;
//! use satusehat_bridge::core::assembler::VisitAssembler;
//! use satusehat_bridge::extract;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("satusehat.toml")?;
//!     let client = FhirClient::connect(&config.fhir, &config.auth).await?;
//!     let assembler = VisitAssembler::new(&client)
//!         .with_dry_run(config.application.dry_run);
//!
//!     // One record fully assembled and submitted before the next begins
//!     for record in extract::read_visit_records("visits.csv", 0)? {
//!         assembler.assemble_and_submit(&record).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`]. A 401 from the store is
//! handled inside the client (one refresh, one retry); any other unexpected
//! status surfaces as [`domain::FhirError::UnexpectedStatus`] and fails the
//! current record visibly.
//!
//! ## Logging
//!
//! Structured logging via the `tracing` crate:
//!
//! ```rust,no_run
//! tracing::info!(entries = 4, "Transaction bundle accepted");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod extract;
pub mod logging;
