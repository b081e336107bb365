//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::FilterState;
use crate::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

/// atmdash - ATM location dashboard
///
/// Filter an ATM dataset by city and bank and summarize it: totals,
/// service hours, accessibility, install type, install location
/// categories and map features.
///
/// Examples:
///   atmdash --data atm.csv
///   atmdash --data atm.csv --city 臺北市 --bank 臺灣銀行 --format markdown
///   atmdash --data atm.csv --format geojson --output atms.geojson
///   atmdash --data atm.csv --city 臺北市 --list-banks
///   atmdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// ATM dataset (CSV with a header row)
    ///
    /// Defaults to the path in .atmdash.toml, then to atm.csv.
    #[arg(short, long, value_name = "FILE", env = "ATMDASH_DATA")]
    pub data: Option<PathBuf>,

    /// City to filter on, or "all"
    #[arg(long, default_value = "all", value_name = "CITY")]
    pub city: String,

    /// Bank to filter on, or "all"
    ///
    /// Applied after the city, so only banks present in that city match.
    #[arg(long, default_value = "all", value_name = "BANK")]
    pub bank: String,

    /// Output format (json, markdown, geojson)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Output file path for the report; "-" or unset writes to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .atmdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Write JSON and GeoJSON on a single line
    #[arg(long)]
    pub compact: bool,

    /// Leave the map features out of the JSON snapshot
    #[arg(long)]
    pub no_features: bool,

    /// Print the cities in the dataset and exit
    #[arg(long, conflicts_with = "list_banks")]
    pub list_cities: bool,

    /// Print the banks in the selected city and exit
    #[arg(long)]
    pub list_banks: bool,

    /// Exit with code 2 when the selection matches no ATMs
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .atmdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.city.trim().is_empty() {
            return Err("City must not be blank (use 'all' for every city)".to_string());
        }

        if self.bank.trim().is_empty() {
            return Err("Bank must not be blank (use 'all' for every bank)".to_string());
        }

        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Data file does not exist: {}", data.display()));
            }
            if !data.is_file() {
                return Err(format!("Data path is not a file: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `--quiet` wins over a config file asking for verbose output.
    pub fn log_level_with(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The city/bank selection given on the command line.
    pub fn filter(&self) -> FilterState {
        FilterState::new(self.city.as_str(), self.bank.as_str())
    }
}
