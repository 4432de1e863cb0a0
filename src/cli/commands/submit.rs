//! Submit command implementation
//!
//! Reads visit records from a CSV export or a single JSON payload and
//! submits each record's transaction bundle, strictly one record at a time.
//! A failing record stops the run visibly; records already submitted stay
//! submitted (each bundle is atomic at the store, there is no cross-record
//! compensation).

use crate::adapters::fhir::FhirClient;
use crate::config::load_config;
use crate::core::assembler::VisitAssembler;
use crate::domain::VisitRecord;
use crate::extract;
use anyhow::{bail, Context};
use clap::Args;
use std::fs;

/// Arguments for the submit command
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// CSV visit export to read records from
    #[arg(long, conflicts_with = "payload")]
    pub file: Option<String>,

    /// JSON file holding a single visit payload
    #[arg(long)]
    pub payload: Option<String>,

    /// Maximum number of rows to process (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Assemble bundles without submitting them
    #[arg(long)]
    pub dry_run: bool,

    /// Re-fetch and print every written resource after each submit
    #[arg(long)]
    pub debug: bool,
}

impl SubmitArgs {
    /// Execute the submit command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = load_config(config_path)
            .with_context(|| format!("failed to load configuration from {config_path}"))?;

        let records = self.collect_records()?;
        if records.is_empty() {
            println!("No visit records to process");
            return Ok(0);
        }

        let dry_run = self.dry_run || config.application.dry_run;
        let debug = self.debug || config.application.debug;

        let client = FhirClient::connect(&config.fhir, &config.auth)
            .await
            .context("failed to connect to the FHIR exchange")?;

        let assembler = VisitAssembler::new(&client)
            .with_dry_run(dry_run)
            .with_debug(debug);

        tracing::info!(
            records = records.len(),
            dry_run = dry_run,
            "Starting visit submission"
        );

        // One record fully assembled and submitted before the next begins.
        for (index, record) in records.iter().enumerate() {
            println!(
                "[{}/{}] {}",
                index + 1,
                records.len(),
                record.registration_id
            );
            assembler
                .assemble_and_submit(record)
                .await
                .with_context(|| {
                    format!("failed to submit visit '{}'", record.registration_id)
                })?;
        }

        if dry_run {
            println!("✅ Assembled {} visit record(s) (dry run)", records.len());
        } else {
            println!("✅ Submitted {} visit record(s)", records.len());
        }

        Ok(0)
    }

    fn collect_records(&self) -> anyhow::Result<Vec<VisitRecord>> {
        match (&self.file, &self.payload) {
            (Some(file), None) => {
                let records = extract::read_visit_records(file, self.limit)?;
                Ok(records)
            }
            (None, Some(payload)) => {
                let contents = fs::read_to_string(payload)
                    .with_context(|| format!("failed to read payload file {payload}"))?;
                Ok(vec![extract::payload::from_json_str(&contents)?])
            }
            _ => bail!("exactly one of --file or --payload is required"),
        }
    }
}
