//! Core business logic.
//!
//! The record-to-document transformation lives here:
//!
//! - [`merge`] - the document merge engine (prior remote state + fresh fragment)
//! - [`builders`] - one builder per resource kind
//! - [`assembler`] - fans one visit record out into an ordered transaction batch
//!
//! # Transformation Workflow
//!
//! One visit record becomes up to ten interlinked resource documents:
//!
//! 1. **Patient** always leads the batch
//! 2. **Encounter** is built early (its prior-state merge runs second) but
//!    appended after the entries it references
//! 3. **AllergyIntolerance** entries fan out from the `|`-delimited allergy text
//! 4. **Practitioner** and **Condition** entries follow the intake and
//!    diagnosis stages; **Observation**, **Location** and **Organization**
//!    entries follow the examination stage
//! 5. The whole batch is submitted as one atomic transaction
//!
//! # Example
//!
//! ```rust,no_run
//! use satusehat_bridge::adapters::fhir::FhirClient;
//! use satusehat_bridge::config::load_config;
//! use satusehat_bridge::core::assembler::VisitAssembler;
//! use satusehat_bridge::domain::VisitRecord;
//!
//! # async fn example(record: VisitRecord) -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("satusehat.toml")?;
//! let client = FhirClient::connect(&config.fhir, &config.auth).await?;
//!
//! let assembler = VisitAssembler::new(&client)
//!     .with_dry_run(config.application.dry_run);
//! assembler.assemble_and_submit(&record).await?;
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod builders;
pub mod merge;

pub use assembler::VisitAssembler;
pub use merge::merge;
