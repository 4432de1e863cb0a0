//! Row extraction.
//!
//! Turns the supported ingestion sources into normalized [`VisitRecord`]s:
//!
//! - [`csv`] - delimited-text visit exports (typed or plain headers)
//! - [`payload`] - a single structured JSON request payload
//!
//! [`VisitRecord`]: crate::domain::VisitRecord

pub mod csv;
pub mod payload;

pub use csv::read_visit_records;
