//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the bridge using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// satusehat-bridge - clinical visit records to FHIR transaction bundles
#[derive(Parser, Debug)]
#[command(name = "satusehat-bridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "satusehat.toml", env = "SATUSEHAT_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SATUSEHAT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit visit records from a CSV export or a JSON payload
    Submit(commands::submit::SubmitArgs),

    /// Look a resource up by kind + identifier or by reference
    Lookup(commands::lookup::LookupArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
